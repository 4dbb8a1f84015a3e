//! Headless-mode flag builder.
//!
//! Maps the common headless flags of the agent CLI onto an ordered argument
//! list. Values go through untouched; the agent binary owns their meaning.

/// Pass-through options for a headless agent run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadlessOptions {
    /// `--permission-mode`, e.g. `plan` for read-only analysis.
    pub permission_mode: Option<String>,
    /// `-p`, the headless prompt.
    pub prompt: Option<String>,
    /// `--allowedTools`, a comma-separated allow-list such as `Bash(git diff:*),Read`.
    pub allowed_tools: Option<String>,
    /// `--output-format`, e.g. `text`, `json` or `stream-json`.
    pub output_format: Option<String>,
    /// `--json-schema`, used together with JSON output.
    pub json_schema: Option<String>,
    /// `--append-system-prompt`.
    pub append_system_prompt: Option<String>,
    /// `--system-prompt`, replacing the default one.
    pub system_prompt: Option<String>,
    /// `--continue` the most recent session.
    pub continue_latest: bool,
    /// `--resume` a specific session id.
    pub resume: Option<String>,
    /// Anything else, appended last and verbatim.
    pub extra: Vec<String>,
}

impl HeadlessOptions {
    /// Renders the options as an argument list.
    ///
    /// Only options that are present are emitted, always in the same order,
    /// followed by `extra`.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        push_opt(&mut args, "--permission-mode", self.permission_mode.as_ref());
        push_opt(&mut args, "-p", self.prompt.as_ref());
        push_opt(&mut args, "--allowedTools", self.allowed_tools.as_ref());
        push_opt(&mut args, "--output-format", self.output_format.as_ref());
        push_opt(&mut args, "--json-schema", self.json_schema.as_ref());
        push_opt(
            &mut args,
            "--append-system-prompt",
            self.append_system_prompt.as_ref(),
        );
        push_opt(&mut args, "--system-prompt", self.system_prompt.as_ref());

        if self.continue_latest {
            args.push("--continue".to_string());
        }

        push_opt(&mut args, "--resume", self.resume.as_ref());

        args.extend(self.extra.iter().cloned());
        args
    }
}

fn push_opt(args: &mut Vec<String>, flag: &str, value: Option<&String>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_produce_no_args() {
        assert!(HeadlessOptions::default().to_args().is_empty());
    }

    #[test]
    fn prompt_only() {
        let opts = HeadlessOptions {
            prompt: Some("Return only the single word OK.".to_string()),
            ..Default::default()
        };
        assert_eq!(opts.to_args(), ["-p", "Return only the single word OK."]);
    }

    #[test]
    fn all_options_in_fixed_order() {
        let opts = HeadlessOptions {
            permission_mode: Some("plan".to_string()),
            prompt: Some("summarize".to_string()),
            allowed_tools: Some("Bash(git diff:*),Read".to_string()),
            output_format: Some("json".to_string()),
            json_schema: Some("{}".to_string()),
            append_system_prompt: Some("be brief".to_string()),
            system_prompt: Some("you are terse".to_string()),
            continue_latest: true,
            resume: Some("abc123".to_string()),
            extra: vec!["--model".to_string(), "opus".to_string()],
        };
        assert_eq!(
            opts.to_args(),
            [
                "--permission-mode",
                "plan",
                "-p",
                "summarize",
                "--allowedTools",
                "Bash(git diff:*),Read",
                "--output-format",
                "json",
                "--json-schema",
                "{}",
                "--append-system-prompt",
                "be brief",
                "--system-prompt",
                "you are terse",
                "--continue",
                "--resume",
                "abc123",
                "--model",
                "opus",
            ]
        );
    }

    #[test]
    fn values_are_not_rewritten() {
        let opts = HeadlessOptions {
            prompt: Some("  --leading dashes and 'quotes'  ".to_string()),
            output_format: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            opts.to_args(),
            [
                "-p",
                "  --leading dashes and 'quotes'  ",
                "--output-format",
                ""
            ]
        );
    }

    #[test]
    fn extra_args_appended_last() {
        let opts = HeadlessOptions {
            continue_latest: true,
            extra: vec!["--verbose".to_string()],
            ..Default::default()
        };
        assert_eq!(opts.to_args(), ["--continue", "--verbose"]);
    }
}
