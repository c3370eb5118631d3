// Prompt discovery.
//
// Switch prompts embed the hostname, so they are learned from the device
// right after login instead of being configured.

use std::sync::LazyLock;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncWrite};

use super::stream::Console;
use super::PromptState;
use crate::error::Error;

/// Any prompt at the end of a fresh line.
static ANY_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+.+#").expect("prompt pattern is valid"));

/// Literal patterns for the three prompts of an IOS-style CLI.
#[derive(Debug, Clone)]
pub struct Prompts {
    main_text: String,
    main: Regex,
    config: Regex,
    interface: Regex,
}

impl Prompts {
    /// Build the prompt set from the main prompt text, e.g. `switch1#`.
    pub fn from_main(prompt: &str) -> Result<Self, Error> {
        let base = prompt
            .strip_suffix('#')
            .filter(|base| !base.is_empty())
            .ok_or_else(|| Error::protocol(format!("unrecognized prompt {prompt:?}")))?;

        let literal = |text: &str| {
            Regex::new(&regex::escape(text))
                .map_err(|e| Error::protocol(format!("prompt pattern for {text:?}: {e}")))
        };

        Ok(Self {
            main_text: prompt.to_string(),
            main: literal(prompt)?,
            config: literal(&format!("{base}(config)#"))?,
            interface: literal(&format!("{base}(config-if)#"))?,
        })
    }

    /// Provoke a fresh prompt with an empty line and derive the set from it.
    pub async fn discover<S>(console: &mut Console<S>) -> Result<Self, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        console.send_line("").await?;
        let found = console.expect(&ANY_PROMPT).await?;
        let last_line = found
            .matched
            .split(['\r', '\n'])
            .next_back()
            .unwrap_or_default()
            .trim();
        Self::from_main(last_line)
    }

    pub fn main_text(&self) -> &str {
        &self.main_text
    }

    /// Pattern expected after a command leaves the CLI in `state`.
    pub(crate) fn pattern(&self, state: PromptState) -> &Regex {
        match state {
            PromptState::Main | PromptState::Disconnected => &self.main,
            PromptState::Config => &self.config,
            PromptState::Interface => &self.interface,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn prompts_derived_from_main() {
        let prompts = Prompts::from_main("switch1#").unwrap();
        assert_eq!(prompts.main_text(), "switch1#");
        assert!(prompts.pattern(PromptState::Config).is_match("\r\nswitch1(config)#"));
        assert!(prompts.pattern(PromptState::Interface).is_match("switch1(config-if)#"));
        assert!(!prompts.pattern(PromptState::Main).is_match("switch1(config)#"));
    }

    #[test]
    fn prompt_metacharacters_are_literal() {
        let prompts = Prompts::from_main("core.sw+1#").unwrap();
        assert!(prompts.pattern(PromptState::Main).is_match("core.sw+1#"));
        assert!(!prompts.pattern(PromptState::Main).is_match("corexswww1#"));
    }

    #[test]
    fn rejects_prompt_without_hash() {
        assert!(Prompts::from_main("switch1>").is_err());
        assert!(Prompts::from_main("#").is_err());
    }

    #[test]
    fn any_prompt_takes_the_last_line() {
        let found = ANY_PROMPT.find("banner\r\n\r\nsw-7#").unwrap();
        let last = found.as_str().split(['\r', '\n']).next_back().unwrap();
        assert_eq!(last, "sw-7#");
    }
}
