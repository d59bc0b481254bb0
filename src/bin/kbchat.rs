//! Interactive terminal client for a knowledge-base chat backend.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the backend named by $KBCHAT_HOST (or http://127.0.0.1:8000)
//! kbchat
//!
//! # Pick a backend, model, and knowledge-base index
//! kbchat --host http://kb.internal:8000 --model deepseek-r1:8b --index manuals
//!
//! # Disable colors (useful for piping output)
//! kbchat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/chats` - List chats
//! - `/select <n|id>` - Switch chats
//! - `/think` - Show or hide the latest reasoning
//! - `/quit` - Exit the application

use std::sync::Arc;

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use kbchat::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatController, DEFAULT_CHAT_TITLE, NO_INDEX, help_text,
    parse_command,
};
use kbchat::{
    ChatClient, CommandEvent, FileSessionStore, Renderer, StderrLogger, TerminalRenderer,
};

type Controller = ChatController<ChatClient, TerminalRenderer, FileSessionStore>;

/// Main entry point for the kbchat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("kbchat [OPTIONS]");
    let config = ChatConfig::from(args);

    let mut client = ChatClient::new(Some(config.host.clone()))?;
    if config.verbose {
        client = client.with_logger(Arc::new(StderrLogger::new().with_chunks()));
    }
    let store = FileSessionStore::new(&config.session_path);
    let renderer = TerminalRenderer::with_color(config.use_color);
    let mut controller = ChatController::new(client, renderer, store);
    controller.set_tip_words(config.tip_words.clone());
    let mut rl = DefaultEditor::new()?;

    println!("kbchat ({})", controller.backend().host());
    println!("Type /help for commands, /quit to exit\n");

    if controller.start_session().await.is_ok() {
        apply_preferences(&mut controller, &config);
    }

    loop {
        let readline = rl.readline("> ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                let command = parse_command(line);
                let offline = matches!(command, Some(ChatCommand::Quit | ChatCommand::Help));
                if !offline && !controller.is_linked() {
                    if controller.start_session().await.is_err() {
                        continue;
                    }
                    apply_preferences(&mut controller, &config);
                }

                // Check for slash commands
                if let Some(cmd) = command {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::New(title) => {
                            let title = title.as_deref().unwrap_or(DEFAULT_CHAT_TITLE);
                            let _ = controller.create_chat(title).await;
                        }
                        ChatCommand::Chats => print_chats(&mut controller),
                        ChatCommand::Select(reference) => {
                            match controller.selectors().resolve_chat(&reference) {
                                Some(chat) => {
                                    let _ = controller.select_chat(&chat).await;
                                }
                                None => controller
                                    .renderer_mut()
                                    .alert(&format!("No chat matches {reference}")),
                            }
                        }
                        ChatCommand::Remove(reference) => {
                            match controller.selectors().resolve_chat(&reference) {
                                Some(chat) => {
                                    let mut event = CommandEvent::new();
                                    let _ = controller.remove_chat(&chat, &mut event).await;
                                }
                                None => controller
                                    .renderer_mut()
                                    .alert(&format!("No chat matches {reference}")),
                            }
                        }
                        ChatCommand::Clear => {
                            if controller.clear_context().await.is_ok() {
                                controller.renderer_mut().print_info("Context cleared.");
                            }
                        }
                        ChatCommand::Model(model) => {
                            let _ = controller.select_model(&model);
                        }
                        ChatCommand::Models => {
                            let listing = list(
                                &controller.selectors().models,
                                controller.selectors().model.as_deref(),
                            );
                            controller.renderer_mut().print_info(&listing);
                        }
                        ChatCommand::Index(index) => {
                            let _ = controller.select_index(Some(&index));
                        }
                        ChatCommand::Indexes => {
                            let mut indexes = vec![NO_INDEX.to_string()];
                            indexes.extend(controller.selectors().indexes.iter().cloned());
                            let current = controller.selectors().index.as_deref().unwrap_or(NO_INDEX);
                            let listing = list(&indexes, Some(current));
                            controller.renderer_mut().print_info(&listing);
                        }
                        ChatCommand::At(index) => {
                            if controller.mention_index(Some(&index)).is_ok() {
                                let info = match controller.pending_mention().flatten() {
                                    Some(index) => format!("Next message mentions @{index}."),
                                    None => "Next message drops its @mention.".to_string(),
                                };
                                controller.renderer_mut().print_info(&info);
                            }
                        }
                        ChatCommand::Tip(words) => {
                            let words = words.unwrap_or_default();
                            let info = if words.is_empty() {
                                "Tip words cleared.".to_string()
                            } else {
                                format!("Tip words for new chats: {words}")
                            };
                            controller.set_tip_words(words);
                            controller.renderer_mut().print_info(&info);
                        }
                        ChatCommand::Think(n) => {
                            let target = controller
                                .transcript()
                                .nth_with_reasoning_from_end(n)
                                .cloned();
                            match target {
                                Some(id) => {
                                    controller.toggle_reasoning(&id);
                                }
                                None => controller
                                    .renderer_mut()
                                    .print_info("No reply with reasoning to toggle."),
                            }
                        }
                        ChatCommand::Stop => {
                            if controller.stop_session().await.is_ok() {
                                controller
                                    .renderer_mut()
                                    .print_info("Session stopped; the next input restarts it.");
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            controller.renderer_mut().alert(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the backend
                let _ = controller.send_message(line).await;
                println!();
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                controller
                    .renderer_mut()
                    .alert(&format!("Input error: {}", err));
                break;
            }
        }
    }

    controller.teardown();
    Ok(())
}

/// Select the model and index named on the command line, when offered.
fn apply_preferences(controller: &mut Controller, config: &ChatConfig) {
    if let Some(model) = &config.model {
        let _ = controller.select_model(model);
    }
    if let Some(index) = &config.index {
        let _ = controller.select_index(Some(index));
    }
}

fn print_chats(controller: &mut Controller) {
    let selectors = controller.selectors();
    let listing = if selectors.chats.is_empty() {
        "    (no chats; send a message to start one)".to_string()
    } else {
        selectors
            .chats
            .iter()
            .enumerate()
            .map(|(i, chat)| {
                let marker = if selectors.chat.as_ref() == Some(&chat.id) {
                    "*"
                } else {
                    " "
                };
                format!("  {marker} {:>2}. {}  ({})", i + 1, chat.title, chat.id)
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    controller.renderer_mut().print_info(&listing);
}

fn list(items: &[String], current: Option<&str>) -> String {
    if items.is_empty() {
        return "    (none available)".to_string();
    }
    items
        .iter()
        .map(|item| {
            let marker = if Some(item.as_str()) == current {
                "*"
            } else {
                " "
            };
            format!("  {marker} {item}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
