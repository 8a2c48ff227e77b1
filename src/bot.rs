//! Chat command handling, independent of any chat transport.
//!
//! A transport feeds incoming message text to [`ChapterBot::handle`] and
//! delivers the returned replies in order.

use std::path::PathBuf;

use rand::seq::IndexedRandom;
use tracing::{debug, error, info};

use crate::config::SiteConfig;
use crate::crawler::ChapterAssembler;
use crate::error::{Error, Result};

const CHARACTERS: &[&str] = &[
    "🍖🍖😁🍖🍖",
    "🍺⚔😏⚔🍺",
    "🍊💰😜💰🌩",
    "💃🍚😍🍽👯",
    "🎯🌱😱🌱🎯",
    "💉💊🐐💊💉",
    "📚🗿💁🏻🗿📚",
    "🔩🛠🤖🚤⚙",
    "🎼🎹💀🎻🗡",
];

pub const HELP: &str = "❓❓❓

  • /start: Get a warm welcome message!
  • /help: Sends this message
  • /download <chapter number>: Download a one piece manga chapter

All the chapters I provide are downloaded from TCB Scans (https://tcbscans.carrd.co/).
So shoutout to them!";

#[derive(Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Start,
    Help,
    /// Raw argument text; validated when handled.
    Download(&'a str),
    /// A command this bot does not know. Ignored.
    Unsupported,
    /// Plain text rather than a command.
    Text,
}

impl<'a> Command<'a> {
    pub fn parse(text: &'a str) -> Self {
        let text = text.trim();
        let Some(command) = text.strip_prefix('/') else {
            return Command::Text;
        };

        let (name, argument) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        // "/download@SomeBot 1044" in group chats
        let name = name.split('@').next().unwrap_or(name);

        match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "download" => Command::Download(argument.trim()),
            _ => Command::Unsupported,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Document { path: PathBuf, caption: String },
}

pub struct ChapterBot {
    assembler: ChapterAssembler,
}

impl ChapterBot {
    pub fn new(assembler: ChapterAssembler) -> Self {
        Self { assembler }
    }

    /// A bot that keeps chapters in the system temp directory, so warm
    /// instances can hand out chapters they already built.
    pub fn with_site(site: SiteConfig) -> Result<Self> {
        Ok(Self::new(ChapterAssembler::new(site, std::env::temp_dir())?))
    }

    pub fn assembler(&self) -> &ChapterAssembler {
        &self.assembler
    }

    pub async fn handle(&self, user: &str, text: &str) -> Vec<Reply> {
        match Command::parse(text) {
            Command::Start => vec![
                Reply::Text(format!(
                    "👋🏼👋🏼👋🏼 Hi {}!\n\
                     Welcome to One Piece Manga Bot Downloader!\n\
                     Read the below instructions to learn how to download a chapter.\n\
                     Let's set sail for the Grand Line!",
                    user
                )),
                Reply::Text(HELP.to_owned()),
            ],
            Command::Help => vec![Reply::Text(HELP.to_owned())],
            Command::Download(argument) => self.download(argument).await,
            Command::Unsupported => Vec::new(),
            Command::Text => vec![Reply::Text(
                "❌ I can't help you, seems you sent an invalid command...".to_owned(),
            )],
        }
    }

    async fn download(&self, argument: &str) -> Vec<Reply> {
        debug!(argument, "download command issued");
        let Some(chapter) = argument.parse::<u32>().ok().filter(|&n| n > 0) else {
            return vec![Reply::Text(format!(
                "❌ Invalid chapter number: {}...",
                argument
            ))];
        };

        let mut replies = vec![Reply::Text(format!(
            "⏳ Downloading chapter {}, please wait...",
            chapter
        ))];

        let reply = match self.assembler.run(&[chapter]).await {
            Ok(paths) => match paths.into_iter().next() {
                Some(path) => {
                    info!(chapter, "sending {}", path.display());
                    let character = CHARACTERS
                        .choose(&mut rand::rng())
                        .copied()
                        .unwrap_or(CHARACTERS[0]);
                    Reply::Document {
                        path,
                        caption: format!("{} Here you have your chapter, enjoy it!", character),
                    }
                }
                None => unexpected(),
            },
            Err(Error::ChapterNotFound { chapter }) => Reply::Text(format!(
                "❌ Chapter {} is not yet available.",
                chapter
            )),
            Err(e) => {
                error!(chapter, "download failed: {}", e);
                unexpected()
            }
        };
        replies.push(reply);
        replies
    }
}

fn unexpected() -> Reply {
    Reply::Text("🐛 Unexpected error found...".to_owned())
}
