use iced::widget::{button, column, container, image, row, stack, text, text_input, Canvas};
use iced::{Alignment, Element, Length, Point, Task, Theme};
use rfd::FileDialog;

// Declare the application modules
mod error;
mod persist;
mod render;
mod state;
mod ui;

use error::LayoutError;
use state::layout::Layout;
use state::session::Session;

/// Main application state
struct LayoutEditor {
    /// The editing session: the marker layout plus the current selection
    session: Session,
    /// The keyboard template currently loaded, if any
    template: Option<render::Template>,
    /// Label for the next marker placement
    pending_label: String,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Open Template"
    OpenTemplate,
    /// User clicked "Save Layout"
    SaveLayout,
    /// User clicked "Load Layout"
    LoadLayout,
    /// User clicked "Save as Image"
    ExportImage,
    /// User clicked "Delete Selected Marker"
    DeleteSelected,
    /// The pending-label field changed
    PendingLabelChanged(String),
    /// Canvas: place a marker at this position
    PlaceMarker(Point),
    /// Canvas: a double click near this position selects the nearest marker
    SelectAt(Point),
    /// Canvas: a drag moved the selected marker to this position
    DragMoved(Point),
}

impl LayoutEditor {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        (
            LayoutEditor {
                session: Session::new(),
                template: None,
                pending_label: String::new(),
                status: String::from("Open a keyboard template to start."),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenTemplate => {
                let file = FileDialog::new()
                    .set_title("Select Keyboard Template")
                    .add_filter("PNG Images", &["png"])
                    .add_filter("All Files", &["*"])
                    .pick_file();

                if let Some(path) = file {
                    match render::Template::load(&path) {
                        Ok(template) => {
                            println!(
                                "📁 Template loaded: {} ({}x{})",
                                path.display(),
                                template.width(),
                                template.height()
                            );
                            self.status = format!(
                                "Template {}x{} loaded. Type a label and click to place keys.",
                                template.width(),
                                template.height()
                            );
                            self.template = Some(template);
                            // A fresh template starts a fresh layout
                            self.session.replace_layout(Layout::new());
                        }
                        Err(e) => self.status = format!("❌ {e}"),
                    }
                }

                Task::none()
            }

            Message::SaveLayout => {
                // Serializing first means an empty layout is refused before
                // any dialog or file is touched.
                match persist::serialize(self.session.layout()) {
                    Ok(json) => {
                        let file = FileDialog::new()
                            .set_title("Save Keyboard Layout")
                            .add_filter("JSON Files", &["json"])
                            .set_file_name("keyboard_layout.json")
                            .save_file();

                        if let Some(path) = file {
                            match std::fs::write(&path, json) {
                                Ok(()) => {
                                    println!("💾 Layout saved to {}", path.display());
                                    self.status =
                                        format!("✅ Keyboard layout saved to {}", path.display());
                                }
                                Err(e) => {
                                    self.status =
                                        format!("❌ Failed to write {}: {e}", path.display())
                                }
                            }
                        }
                    }
                    Err(e) => self.status = format!("❌ {e}"),
                }

                Task::none()
            }

            Message::LoadLayout => {
                let Some(template) = self.template.as_ref() else {
                    self.status = format!("❌ {}", LayoutError::MissingTemplate);
                    return Task::none();
                };

                let file = FileDialog::new()
                    .set_title("Load Keyboard Layout")
                    .add_filter("JSON Files", &["json"])
                    .add_filter("All Files", &["*"])
                    .pick_file();

                if let Some(path) = file {
                    match persist::load_from_path(&path) {
                        Ok(layout) => {
                            let stray = template.out_of_bounds(&layout);
                            if !stray.is_empty() {
                                eprintln!(
                                    "⚠️  {} key(s) fall outside the template bounds: {:?}",
                                    stray.len(),
                                    stray
                                );
                            }
                            let count = layout.len();
                            self.session.replace_layout(layout);
                            self.status =
                                format!("✅ Loaded {count} keys from {}", path.display());
                        }
                        Err(e) => self.status = format!("❌ {e}"),
                    }
                }

                Task::none()
            }

            Message::ExportImage => {
                let Some(template) = self.template.as_ref() else {
                    self.status = format!("❌ {}", LayoutError::MissingTemplate);
                    return Task::none();
                };

                let file = FileDialog::new()
                    .set_title("Save Layout as Image")
                    .add_filter("PNG Images", &["png"])
                    .set_file_name("keyboard_layout.png")
                    .save_file();

                if let Some(path) = file {
                    match template.export_layout(self.session.layout(), &path) {
                        Ok(()) => {
                            println!("🖼  Layout image saved to {}", path.display());
                            self.status = format!("✅ Layout saved as {}", path.display());
                        }
                        Err(e) => self.status = format!("❌ {e}"),
                    }
                }

                Task::none()
            }

            Message::DeleteSelected => {
                match self.session.delete_selected() {
                    Ok(Some(label)) => self.status = format!("Removed \"{label}\""),
                    Ok(None) => {
                        self.status =
                            String::from("No marker selected. Double-click a marker first.")
                    }
                    Err(e) => self.status = format!("❌ {e}"),
                }

                Task::none()
            }

            Message::PendingLabelChanged(value) => {
                self.pending_label = value;
                Task::none()
            }

            Message::PlaceMarker(pos) => {
                let label = self.pending_label.trim().to_string();
                if label.is_empty() {
                    self.status = String::from("Type a key label before clicking.");
                } else {
                    match self.session.add_marker(label.clone(), (pos.x, pos.y)) {
                        Ok(()) => {
                            self.pending_label.clear();
                            self.status =
                                format!("Added \"{label}\" at ({:.0}, {:.0})", pos.x, pos.y);
                        }
                        Err(e) => self.status = format!("❌ {e}"),
                    }
                }

                Task::none()
            }

            Message::SelectAt(pos) => {
                match self.session.select_nearest((pos.x, pos.y)) {
                    Some(label) => self.status = format!("Selected \"{label}\""),
                    None => {
                        self.session.clear_selection();
                        self.status = String::from("No marker near that point.");
                    }
                }

                Task::none()
            }

            Message::DragMoved(pos) => {
                if let Err(e) = self.session.move_selected((pos.x, pos.y)) {
                    self.status = format!("❌ {e}");
                }

                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let toolbar = row![
            button("Open Template").on_press(Message::OpenTemplate).padding(10),
            button("Save Layout").on_press(Message::SaveLayout).padding(10),
            button("Load Layout").on_press(Message::LoadLayout).padding(10),
            button("Save as Image").on_press(Message::ExportImage).padding(10),
            button("Delete Selected Marker")
                .on_press(Message::DeleteSelected)
                .padding(10),
        ]
        .spacing(10);

        let label_entry = row![
            text("Key label:"),
            text_input("Next key label", &self.pending_label)
                .on_input(Message::PendingLabelChanged)
                .width(200),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let surface: Element<Message> = match &self.template {
            Some(template) => {
                let width = template.width() as f32;
                let height = template.height() as f32;

                let markers = Canvas::new(ui::canvas::LayoutCanvas {
                    layout: self.session.layout(),
                    selected: self.session.selected(),
                    can_place: !self.pending_label.trim().is_empty(),
                })
                .width(width)
                .height(height);

                stack![
                    image(template.handle().clone()).width(width).height(height),
                    markers,
                ]
                .into()
            }
            None => text("No template loaded.").size(16).into(),
        };

        let content = column![toolbar, label_entry, surface, text(&self.status).size(16)]
            .spacing(20)
            .padding(20)
            .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    iced::application(
        "Keyboard Layout Setup",
        LayoutEditor::update,
        LayoutEditor::view,
    )
    .theme(LayoutEditor::theme)
    .centered()
    .run_with(LayoutEditor::new)
}
