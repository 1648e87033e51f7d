//! One caller's state: the active mode and the basic-mode conversation.
//!
//! Both the CLI and any UI host drive the same [`Session`], so there is a
//! single agent loop and a single basic chat behind every surface.

use std::fmt;
use std::sync::Arc;

use crate::agent::Agent;
use crate::chat::BasicChat;
use crate::errors::ExplorerResult;
use crate::providers::base::Provider;
use crate::providers::types::message::Message;
use crate::tools::ToolRegistry;
use crate::transparency::TransparencyLogger;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Basic,
    Agent,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Basic => f.write_str("Basic LLM"),
            Mode::Agent => f.write_str("Agent"),
        }
    }
}

/// A line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Switch(Mode),
    Say(String),
    Empty,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Command::Empty,
            "quit" | "exit" | "q" => Command::Quit,
            "basic" | "1" => Command::Switch(Mode::Basic),
            "agent" | "2" => Command::Switch(Mode::Agent),
            _ => Command::Say(trimmed.to_string()),
        }
    }
}

pub struct Session {
    mode: Mode,
    history: Vec<Message>,
    chat: BasicChat,
    agent: Agent,
}

impl Session {
    pub fn new(
        provider: Arc<dyn Provider>,
        registry: ToolRegistry,
        logger: Arc<dyn TransparencyLogger>,
    ) -> Self {
        Self {
            mode: Mode::default(),
            history: Vec::new(),
            chat: BasicChat::new(provider.clone()).with_logger(logger.clone()),
            agent: Agent::new(provider, registry).with_logger(logger),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The basic-mode conversation so far.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Switch modes; the conversation always starts over.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.history.clear();
    }

    /// Run one turn in the current mode and return the text to show.
    pub fn handle(&mut self, text: &str) -> ExplorerResult<String> {
        match self.mode {
            Mode::Basic => {
                self.history.push(Message::user(text)?);
                match self.chat.respond(&self.history) {
                    Ok(reply) => {
                        self.history.push(Message::assistant(&reply)?);
                        Ok(reply)
                    }
                    Err(e) => {
                        // drop the unanswered turn so a retry sends it once
                        self.history.pop();
                        Err(e)
                    }
                }
            }
            Mode::Agent => Ok(self.agent.reply(text)?.content),
        }
    }
}
