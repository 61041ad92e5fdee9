//! Heuristic extraction of command names from shell scripts
//!
//! This is not a shell parser. The pipeline is:
//!
//! 1. split the script into lines, dropping blanks, comments and shebangs
//! 2. split each line at control and redirection operators
//! 3. skip leading `NAME=value` assignments and wrapper commands (`sudo`, `env`, ...)
//! 4. reduce the first remaining word to its basename
//!
//! Known limitations: quoting and escaping are ignored, so an operator inside a
//! string splits the line; subshells, functions, heredoc bodies and line
//! continuations are not understood. Odd input yields odd or no commands,
//! never an error.

/// Operators that end one command and start the next, longest first
pub const COMMAND_SEPARATORS: &[&str] = &["||", "|", "&&", ";", ">>", "<<", ">", "<"];

/// Commands that only wrap the real command and can be stacked
pub const WRAPPER_PREFIXES: &[&str] = &["sudo", "env", "time", "nohup", "setsid", "stdbuf"];

/// Extracts the command basenames invoked by a script, in order of appearance
pub fn extract_commands(script: &str) -> Vec<String> {
    script
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(split_command_line)
        .filter_map(command_of_fragment)
        .filter_map(|command| basename(command).map(str::to_string))
        .collect()
}

/// Splits a line into single-command fragments at [`COMMAND_SEPARATORS`]
pub fn split_command_line(line: &str) -> Vec<&str> {
    let mut fragments = vec![line];
    for separator in COMMAND_SEPARATORS {
        fragments = fragments
            .into_iter()
            .flat_map(|fragment| fragment.split(*separator))
            .map(str::trim)
            .filter(|fragment| !fragment.is_empty())
            .collect();
    }
    fragments
}

/// Returns the command word of one fragment, skipping assignments and wrappers
pub fn command_of_fragment(fragment: &str) -> Option<&str> {
    fragment
        .split_whitespace()
        .find(|token| !is_assignment(token) && !WRAPPER_PREFIXES.contains(token))
}

fn is_assignment(token: &str) -> bool {
    token.contains('=')
}

/// Strips any directory part: `/usr/bin/docker` becomes `docker`
pub fn basename(command: &str) -> Option<&str> {
    let name = command.rsplit('/').next().unwrap_or(command).trim();
    (!name.is_empty()).then_some(name)
}
