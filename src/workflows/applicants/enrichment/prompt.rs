/// Fixed instruction template for the recruiting-analyst assessment. The
/// response format is load-bearing: `parser` scans for exactly these labels.
pub(crate) fn build_assessment_prompt(profile_json: &str) -> String {
    format!(
        "You are a recruiting analyst. Given this JSON applicant profile, do four things:\n\
         1. Provide a concise 75-word summary.\n\
         2. Rate overall candidate quality from 1-10 (higher is better).\n\
         3. List any data gaps or inconsistencies you notice.\n\
         4. Suggest up to three follow-up questions to clarify gaps.\n\
         \n\
         Return your response in exactly this format:\n\
         Summary: <text>\n\
         Score: <integer>\n\
         Issues: <comma-separated list or 'None'>\n\
         Follow-Ups: <bullet list>\n\
         \n\
         Applicant JSON:\n\
         {profile_json}\n"
    )
}
