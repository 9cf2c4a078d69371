//! Access token setup step
//!
//! Collects the YNAB personal access token and the terms acknowledgement.

use crate::error::{YnabError, YnabResult};
use crate::setup::prompt::{prompt_secret, prompt_yes_no};

/// Token setup step
pub struct TokenSetupStep;

impl TokenSetupStep {
    /// Run the token step; `preset` skips the prompt
    pub fn run(preset: Option<String>, terms_accepted: bool) -> YnabResult<String> {
        println!();
        println!("Step 1: Access Token");
        println!("====================");
        println!();

        if !terms_accepted {
            println!("ynab-sensors reads your budget through the YNAB API using a");
            println!("personal access token. It is not affiliated with YNAB and the");
            println!("token is stored in plain text in the configuration file,");
            println!("which only your user can read.");
            println!();
            if !prompt_yes_no("Do you accept these terms? (yes/no) [no]: ", false)? {
                return Err(YnabError::Validation(
                    "Terms not accepted, please accept terms to continue".into(),
                ));
            }
        }

        let token = match preset {
            Some(token) => token.trim().to_string(),
            None => {
                println!("Create a token under Account Settings > Developer Settings.");
                prompt_secret("Access token: ")?
            }
        };

        if token.is_empty() {
            return Err(YnabError::Validation("Access token cannot be empty".into()));
        }

        Ok(token)
    }
}
