/// Fields recovered from a completion. Any subset may be present; a fully
/// empty assessment means the response carried none of the expected labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmAssessment {
    pub summary: Option<String>,
    pub score: Option<u8>,
    pub follow_ups: Option<String>,
}

impl LlmAssessment {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.score.is_none() && self.follow_ups.is_none()
    }
}

/// Line-oriented, order-insensitive scan of the completion text.
///
/// `Summary:` and `Score:` capture the remainder of their line (a malformed
/// score is dropped, not an error). `Issues:` or `Follow-Ups:` opens an
/// accumulator that keeps the label line itself and every subsequent
/// non-empty line until end of input or another recognized label.
pub(crate) fn parse_completion(text: &str) -> LlmAssessment {
    let mut assessment = LlmAssessment::default();
    let mut follow_ups = String::new();
    let mut in_follow_ups = false;

    for line in text.trim().lines() {
        if let Some(rest) = line.strip_prefix("Summary:") {
            assessment.summary = Some(rest.trim().to_string());
            in_follow_ups = false;
        } else if let Some(rest) = line.strip_prefix("Score:") {
            match rest.trim().parse::<u8>() {
                Ok(score) => {
                    assessment.score = Some(score);
                    in_follow_ups = false;
                }
                Err(_) => continue,
            }
        } else if line.starts_with("Issues:") || line.starts_with("Follow-Ups:") {
            follow_ups.push_str(line);
            follow_ups.push('\n');
            in_follow_ups = true;
        } else if in_follow_ups && !line.trim().is_empty() {
            follow_ups.push_str(line);
            follow_ups.push('\n');
        }
    }

    let follow_ups = follow_ups.trim().to_string();
    if !follow_ups.is_empty() {
        assessment.follow_ups = Some(follow_ups);
    }

    assessment
}
