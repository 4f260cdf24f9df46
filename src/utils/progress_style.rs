use indicatif::ProgressStyle;

const ONLY_MESSAGE_TEMPLATE: &str = "{spinner} {wide_msg}";
const PERCENT_TEMPLATE: &str = "{spinner} {msg:15} {wide_bar:} {pos:>3}/{len:3}%";

pub struct ProgressStyleTemplate;

impl ProgressStyleTemplate {
    pub fn only_message() -> ProgressStyle {
        template(ONLY_MESSAGE_TEMPLATE)
    }

    pub fn percent_bar() -> ProgressStyle {
        template(PERCENT_TEMPLATE).progress_chars("#>-")
    }
}

fn template(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_spinner())
}
