//! Main application for the valley GUI

use eframe::egui;
use egui::{CentralPanel, Context, CornerRadius, Frame, RichText, ScrollArea, SidePanel, TopBottomPanel};

use crate::board::Side;
use crate::search::{ProgressRecord, SearchSession};
use crate::Engine;

use super::board_view::BoardView;
use super::game_state::GameState;
use super::theme::*;

/// Main valley application
pub struct ValleyApp {
    state: GameState,
    board_view: BoardView,
    show_thoughts: bool,
}

impl ValleyApp {
    /// Create the app around a decision engine.
    pub fn new<E: Engine>(
        _cc: &eframe::CreationContext<'_>,
        engine: E,
        collect_first_move_scores: bool,
    ) -> Self {
        Self {
            state: GameState::new(SearchSession::with_engine(engine), collect_first_move_scores),
            board_view: BoardView::default(),
            show_thoughts: true,
        }
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &Context) {
        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Game", |ui| {
                    if ui.button("New Game (N)").clicked() {
                        self.state.start_new_game();
                        ui.close_menu();
                    }
                    if ui.button("Stop Thinking (S)").clicked() {
                        self.state.stop_thinking();
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_thoughts, "Thoughts Panel (T)");
                });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Ply {}/{}", self.state.history.cursor(), self.state.history.len().saturating_sub(1)));
                });
            });
        });
    }

    /// Helper to create a card frame
    fn card_frame() -> Frame {
        Frame::new()
            .fill(CARD_BG)
            .corner_radius(CornerRadius::same(8))
            .inner_margin(12.0)
    }

    /// Render the side panel with game info
    fn render_side_panel(&mut self, ctx: &Context) {
        SidePanel::right("info_panel")
            .min_width(260.0)
            .max_width(320.0)
            .frame(Frame::new().fill(PANEL_BG))
            .show(ctx, |ui| {
                ui.add_space(12.0);
                self.render_turn_card(ui);
                ui.add_space(10.0);
                self.render_actions_card(ui);
                ui.add_space(10.0);
                self.render_history_card(ui);

                if self.show_thoughts {
                    ui.add_space(10.0);
                    self.render_thoughts_card(ui);
                }

                if let Some(msg) = self.state.message.clone() {
                    ui.add_space(10.0);
                    Self::card_frame().show(ui, |ui| {
                        ui.label(RichText::new(format!("\u{26a0} {msg}")).size(11.0).color(TEXT_PRIMARY));
                    });
                }
            });
    }

    /// Render turn/status card
    fn render_turn_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            match self.state.current_board() {
                None => {
                    ui.label(RichText::new("No game").size(16.0).color(TEXT_SECONDARY));
                    ui.label(RichText::new("Press New Game to start").size(11.0).color(TEXT_MUTED));
                }
                Some(board) => {
                    if let Some(winner) = board.winner() {
                        let name = if winner == Side::White { "WHITE" } else { "BLACK" };
                        ui.label(RichText::new(format!("{name} WINS")).size(18.0).strong().color(WIN_HIGHLIGHT));
                        ui.label(RichText::new("king reached the valley").size(11.0).color(TEXT_SECONDARY));
                        return;
                    }
                    let (symbol, name) = match board.whose_turn() {
                        Side::White => ("\u{25cb}", "WHITE"),
                        Side::Black => ("\u{25cf}", "BLACK"),
                    };
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(symbol).size(24.0).color(TEXT_PRIMARY));
                        ui.label(RichText::new(format!("{name} to move")).size(16.0).strong().color(TEXT_PRIMARY));
                    });
                    let status = if self.state.is_thinking() {
                        let secs = self
                            .state
                            .session
                            .elapsed()
                            .map_or(0.0, |d| d.as_secs_f32());
                        (format!("thinking\u{2026} {secs:.1}s"), THINKING)
                    } else {
                        ("engine idle".to_string(), READY)
                    };
                    ui.label(RichText::new(status.0).size(12.0).color(status.1));
                }
            }
        });
    }

    /// Render actions card
    fn render_actions_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("ACTIONS").size(10.0).color(TEXT_MUTED));
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                if ui.button("New Game").clicked() {
                    self.state.start_new_game();
                }
                if ui
                    .add_enabled(self.state.is_thinking(), egui::Button::new("Stop Thinking"))
                    .clicked()
                {
                    self.state.stop_thinking();
                }
            });

            ui.add_space(6.0);
            let suggestion = self.state.suggested_move();
            let label = match suggestion {
                Some(m) => format!("Play {m}"),
                None => "Play ?".to_string(),
            };
            if ui
                .add_enabled(suggestion.is_some(), egui::Button::new(label))
                .clicked()
            {
                if let Some(m) = suggestion {
                    self.state.play_move(m);
                }
            }

            ui.add_space(6.0);
            ui.checkbox(
                &mut self.state.collect_first_move_scores,
                "Collect first-move scores (slower)",
            );
        });
    }

    /// Render the clickable ply list
    fn render_history_card(&mut self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("HISTORY").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            if self.state.history.is_empty() {
                ui.label(RichText::new("\u{2014}").size(11.0).color(TEXT_MUTED));
                return;
            }

            let cursor = self.state.history.cursor();
            let mut jump_to = None;
            ScrollArea::vertical()
                .id_salt("history")
                .max_height(120.0)
                .show(ui, |ui| {
                    for (i, ply) in self.state.history.plies().iter().enumerate() {
                        let text = match ply.produced_by {
                            Some(m) => format!("#{i}  {m}"),
                            None => format!("#{i}  start"),
                        };
                        let rich = if i == cursor {
                            RichText::new(text).strong().color(TEXT_PRIMARY)
                        } else {
                            RichText::new(text).color(TEXT_SECONDARY)
                        };
                        if ui
                            .add(egui::Label::new(rich).sense(egui::Sense::click()))
                            .clicked()
                        {
                            jump_to = Some(i);
                        }
                    }
                });
            if let Some(i) = jump_to {
                self.state.select_ply(i);
            }
        });
    }

    /// Render the progressive search results, newest first
    fn render_thoughts_card(&self, ui: &mut egui::Ui) {
        Self::card_frame().show(ui, |ui| {
            ui.label(RichText::new("THOUGHTS").size(10.0).color(TEXT_MUTED));
            ui.add_space(6.0);

            let thoughts = self.state.session.thoughts();
            if thoughts.is_empty() {
                ui.label(RichText::new("Waiting for the engine\u{2026}").size(10.0).color(TEXT_MUTED));
                return;
            }

            ScrollArea::vertical()
                .id_salt("thoughts")
                .max_height(260.0)
                .show(ui, |ui| {
                    for thought in thoughts.iter().rev() {
                        self.render_thought(ui, thought);
                        ui.add_space(6.0);
                    }
                });
        });
    }

    fn render_thought(&self, ui: &mut egui::Ui, thought: &ProgressRecord) {
        ui.label(
            RichText::new(format!(
                "Depth {}  score {}  nodes {}  tt {}",
                thought.depth,
                thought.score,
                human_count(thought.nodes_searched),
                human_count(thought.transposition_table_size as u64),
            ))
            .size(11.0)
            .strong()
            .color(READY),
        );
        // best_path is stored leaf-to-root; show it in playing order.
        let line: Vec<String> = thought
            .best_path
            .iter()
            .rev()
            .map(|m| m.to_string())
            .collect();
        if !line.is_empty() {
            ui.label(
                RichText::new(line.join("  \u{00b7}  "))
                    .size(10.0)
                    .color(TEXT_SECONDARY),
            );
        }
        if !thought.first_move_scores.is_empty() {
            let scores: Vec<String> = thought
                .first_move_scores
                .iter()
                .map(|(m, s)| format!("{m}: {s}"))
                .collect();
            ui.label(
                RichText::new(scores.join("   "))
                    .size(10.0)
                    .color(TEXT_MUTED),
            );
        }
    }

    /// Render the main board
    fn render_board(&mut self, ctx: &Context) {
        CentralPanel::default()
            .frame(Frame::new().fill(BOARD_AREA_BG))
            .show(ctx, |ui| {
                let Some(board) = self.state.current_board() else {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            RichText::new("Press New Game to start")
                                .size(18.0)
                                .color(TEXT_MUTED),
                        );
                    });
                    return;
                };

                let targets = self.state.selection_targets();
                let clicked = self.board_view.show(
                    ui,
                    &board,
                    self.state.selected,
                    &targets,
                    self.state.last_move(),
                    board.is_over(),
                );
                if let Some(cell) = clicked {
                    self.state.click_cell(cell);
                }
            });
    }

    /// Handle keyboard shortcuts
    fn handle_input(&mut self, ctx: &Context) {
        ctx.input(|i| {
            if i.key_pressed(egui::Key::N) {
                self.state.start_new_game();
            }
            if i.key_pressed(egui::Key::S) {
                self.state.stop_thinking();
            }
            if i.key_pressed(egui::Key::T) {
                self.show_thoughts = !self.show_thoughts;
            }
        });
    }
}

impl eframe::App for ValleyApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);

        // Drain engine messages and keep the session bound to the board.
        self.state.pump();

        self.render_menu_bar(ctx);
        self.render_side_panel(ctx);
        self.render_board(ctx);

        if self.state.is_thinking() {
            ctx.request_repaint();
        }
    }
}

fn human_count(n: u64) -> String {
    if n < 1_000 {
        format!("{n}")
    } else if n < 1_000_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    }
}
