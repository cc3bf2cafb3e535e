//! In-memory fakes for collaborator traits (testing only)
//!
//! `ScriptedRunner` stands in for real processes: responses are keyed by
//! program name and an argument prefix, and every invocation is recorded so
//! tests can assert on what would have been spawned.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{PreflightError, Result};
use crate::exec::{CommandOutput, CommandRunner, Invocation};

#[derive(Debug, Clone)]
enum Response {
    Output { exit_code: i32, stdout: String },
    Missing,
}

#[derive(Debug, Clone)]
struct Rule {
    program: String,
    args_prefix: Vec<String>,
    response: Response,
}

impl Rule {
    fn matches(&self, invocation: &Invocation) -> bool {
        self.program == invocation.program && invocation.args.starts_with(&self.args_prefix)
    }
}

/// Scripted [`CommandRunner`].
///
/// The rule with the longest matching argument prefix wins; among equally
/// specific rules the one registered last wins. Unmatched invocations exit
/// 0 with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose branch base resolves and whose runtime satisfies
    /// the default version band; everything else succeeds with no output.
    pub fn clean_checkout() -> Self {
        Self::new()
            .respond("git", &["merge-base"], 0, "base000\n")
            .respond("node", &["--version"], 0, "v16.20.2\n")
    }

    /// Answer `program args_prefix..` with `exit_code` and `stdout`.
    pub fn respond(mut self, program: &str, args_prefix: &[&str], exit_code: i32, stdout: &str) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            args_prefix: args_prefix.iter().map(|s| s.to_string()).collect(),
            response: Response::Output {
                exit_code,
                stdout: stdout.to_string(),
            },
        });
        self
    }

    /// Shorthand for a non-zero exit of any `program` invocation whose
    /// arguments start with `args_prefix`.
    pub fn fail(self, program: &str, args_prefix: &[&str]) -> Self {
        self.respond(program, args_prefix, 1, "")
    }

    /// Make `program` impossible to start.
    pub fn missing(mut self, program: &str) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            args_prefix: Vec::new(),
            response: Response::Missing,
        });
        self
    }

    /// Every invocation seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Invocations of one program, in order.
    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.program == program)
            .collect()
    }

    /// Invocations whose arguments contain `arg`.
    pub fn calls_with_arg(&self, arg: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.args.iter().any(|a| a == arg))
            .collect()
    }

    fn lookup(&self, invocation: &Invocation) -> Option<&Rule> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.matches(invocation))
            .max_by_key(|(index, rule)| (rule.args_prefix.len(), *index))
            .map(|(_, rule)| rule)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());

        match self.lookup(invocation).map(|rule| &rule.response) {
            Some(Response::Missing) => Err(PreflightError::ToolInvocation {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "program not found"),
            }),
            Some(Response::Output { exit_code, stdout }) => Ok(CommandOutput {
                exit_code: *exit_code,
                stdout: stdout.clone(),
                stderr: String::new(),
                duration_ms: 0,
            }),
            None => Ok(CommandOutput::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn inv(program: &str, args: &[&str]) -> Invocation {
        Invocation::query(program, args.iter().copied(), Path::new("."))
    }

    #[tokio::test]
    async fn test_unmatched_invocation_succeeds() {
        let runner = ScriptedRunner::new();
        let output = runner.run(&inv("eslint", &["src/"])).await.unwrap();
        assert!(output.success());
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_longest_prefix_wins() {
        let runner = ScriptedRunner::new()
            .respond("git", &["diff"], 0, "")
            .respond("git", &["diff", "--quiet"], 1, "");
        let quiet = runner.run(&inv("git", &["diff", "--quiet", "HEAD"])).await.unwrap();
        let names = runner.run(&inv("git", &["diff", "--name-only"])).await.unwrap();
        assert_eq!(quiet.exit_code, 1);
        assert_eq!(names.exit_code, 0);
    }

    #[tokio::test]
    async fn test_later_rule_overrides_equal_prefix() {
        let runner = ScriptedRunner::new()
            .respond("node", &["--version"], 0, "v16.0.0")
            .respond("node", &["--version"], 0, "v18.0.0");
        let output = runner.run(&inv("node", &["--version"])).await.unwrap();
        assert_eq!(output.stdout, "v18.0.0");
    }

    #[tokio::test]
    async fn test_missing_program_errors() {
        let runner = ScriptedRunner::new().missing("gradle");
        let err = runner.run(&inv("gradle", &["build"])).await.unwrap_err();
        assert!(matches!(err, PreflightError::ToolInvocation { .. }));
        assert_eq!(runner.calls_to("gradle").len(), 1);
    }
}
