//! Line-based prompts shared by the setup steps

use std::io::{self, Write};

use crate::error::{YnabError, YnabResult};

/// Prompt for a string input
pub fn prompt_string(prompt: &str) -> YnabResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

/// Prompt for yes/no; an empty answer takes `default`
pub fn prompt_yes_no(prompt: &str, default: bool) -> YnabResult<bool> {
    let answer = prompt_string(prompt)?;
    Ok(parse_yes_no(&answer).unwrap_or(default))
}

/// Prompt for a secret without echoing it
pub fn prompt_secret(prompt: &str) -> YnabResult<String> {
    rpassword::prompt_password(prompt)
        .map(|s| s.trim().to_string())
        .map_err(|e| YnabError::Io(format!("Failed to read input: {}", e)))
}

pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a comma separated list of 1-based indexes into 0-based ones
pub fn parse_index_list(input: &str, len: usize) -> YnabResult<Vec<usize>> {
    let mut picked = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let n: usize = part
            .parse()
            .map_err(|_| YnabError::Validation(format!("'{}' is not a number", part)))?;
        if n == 0 || n > len {
            return Err(YnabError::Validation(format!(
                "{} is out of range (1-{})",
                n, len
            )));
        }
        if !picked.contains(&(n - 1)) {
            picked.push(n - 1);
        }
    }
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("Y"), Some(true));
        assert_eq!(parse_yes_no(" no "), Some(false));
        assert_eq!(parse_yes_no(""), None);
    }

    #[test]
    fn test_parse_index_list() {
        assert_eq!(parse_index_list("1, 3,3", 3).unwrap(), vec![0, 2]);
        assert!(parse_index_list("", 3).unwrap().is_empty());
        assert!(parse_index_list("4", 3).is_err());
        assert!(parse_index_list("x", 3).is_err());
    }
}
