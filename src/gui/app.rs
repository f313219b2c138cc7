//! eframe application hosting a device screen

use super::device_ui::{DeviceController, DeviceImage, OutputKind, UiButton};
use super::qr::QrCache;
use crate::core::events::AppEvent;
use crate::gpio::ButtonAction;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub const LAMP_ON_SVG: &[u8] = include_bytes!("../../assets/icons/lamp-on.svg");
pub const LAMP_OFF_SVG: &[u8] = include_bytes!("../../assets/icons/lamp-off.svg");

const BUTTON_SIZE: egui::Vec2 = egui::vec2(180.0, 64.0);
const IMAGE_SIZE: f32 = 200.0;
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 50, 47);

/// Something the host window has to do after an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    Close,
    Reboot,
}

/// Window hosting a [`DeviceController`]. Drains the UI event queue every frame
pub struct DeviceApp<C: DeviceController> {
    controller: C,
    events: mpsc::UnboundedReceiver<AppEvent>,
    qr_cache: QrCache,
}

impl<C: DeviceController> DeviceApp<C> {
    pub fn new(controller: C, events: mpsc::UnboundedReceiver<AppEvent>) -> Self {
        Self {
            controller,
            events,
            qr_cache: QrCache::new(),
        }
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Apply every queued event, returning the last host action requested
    pub fn drain_events(&mut self) -> Option<HostAction> {
        let mut action = None;
        while let Ok(event) = self.events.try_recv() {
            if let Some(requested) = self.handle_event(event) {
                action = Some(requested);
            }
        }
        action
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Option<HostAction> {
        match event {
            AppEvent::DeviceState(state) => {
                self.controller.state_update_ui(&state);
                None
            }
            AppEvent::Button(action) => self.handle_button(action),
            AppEvent::DppBootstrap(result) => {
                self.controller.ui_mut().finish_dpp_bootstrap(result);
                None
            }
            AppEvent::DeviceStopped => {
                info!("Device event loop stopped");
                self.controller
                    .ui_mut()
                    .append_output_text(OutputKind::Info, "Device stopped");
                None
            }
        }
    }

    fn handle_button(&mut self, action: ButtonAction) -> Option<HostAction> {
        debug!("Physical button {:?}", action);
        match action {
            ButtonAction::ToggleQrCode => {
                self.controller.press(UiButton::QrCode);
                None
            }
            ButtonAction::ToggleLamp => {
                self.controller.press(UiButton::Toggle);
                None
            }
            ButtonAction::CloseWindow => Some(HostAction::Close),
            ButtonAction::Reboot => Some(HostAction::Reboot),
        }
    }

    fn perform(&mut self, ctx: &egui::Context, action: HostAction) {
        match action {
            HostAction::Close => {
                info!("Closing window");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            HostAction::Reboot => {
                warn!("Rebooting host");
                match std::process::Command::new("sudo").arg("reboot").status() {
                    Ok(status) if status.success() => {}
                    Ok(status) => error!("Reboot exited with {}", status),
                    Err(e) => error!("Failed to run reboot: {}", e),
                }
            }
        }
    }

    fn render_buttons(&mut self, ui: &mut egui::Ui) {
        let mut pressed = None;
        ui.horizontal_centered(|ui| {
            for button in UiButton::ALL {
                let state = self.controller.ui().buttons.get(button);
                let text = if button == UiButton::QrCode && self.controller.ui().qr_code_shown() {
                    "Hide QR Code"
                } else {
                    state.text.as_str()
                };
                let widget = egui::Button::new(egui::RichText::new(text).size(22.0)).min_size(BUTTON_SIZE);
                if ui.add_enabled(state.enabled, widget).clicked() {
                    pressed = Some(button);
                }
            }
        });
        if let Some(button) = pressed {
            self.controller.press(button);
        }
    }

    fn render_device(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let device_ui = self.controller.ui();
        ui.vertical_centered(|ui| {
            ui.heading(device_ui.iface_name());
            ui.add_space(12.0);

            if let Some(uri) = device_ui.dpp_uri().filter(|_| device_ui.qr_code_shown()) {
                match self.qr_cache.get_or_create(ctx, uri) {
                    Some(texture) => {
                        ui.add(egui::Image::new(texture).fit_to_exact_size(egui::vec2(IMAGE_SIZE * 1.5, IMAGE_SIZE * 1.5)));
                    }
                    None => {
                        ui.colored_label(ERROR_COLOR, "URI does not fit in a QR code");
                    }
                }
                ui.label(egui::RichText::new(uri).monospace().small());
                return;
            }

            let (uri, bytes) = match device_ui.image {
                DeviceImage::On => ("bytes://lamp-on.svg", LAMP_ON_SVG),
                DeviceImage::Off => ("bytes://lamp-off.svg", LAMP_OFF_SVG),
            };
            ui.add(egui::Image::from_bytes(uri, bytes).fit_to_exact_size(egui::vec2(IMAGE_SIZE, IMAGE_SIZE)));
        });
    }

    fn render_output(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in self.controller.ui().output.lines() {
                    let text = format!("{} {}", line.timestamp.format("%H:%M:%S"), line.text);
                    let text = egui::RichText::new(text).monospace();
                    match line.kind {
                        OutputKind::Info => ui.label(text),
                        OutputKind::Error => ui.label(text.color(ERROR_COLOR)),
                    };
                }
            });
    }
}

impl<C: DeviceController> eframe::App for DeviceApp<C> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(action) = self.drain_events() {
            self.perform(ctx, action);
        }

        egui::TopBottomPanel::bottom("buttons")
            .exact_height(BUTTON_SIZE.y + 24.0)
            .show(ctx, |ui| self.render_buttons(ui));

        egui::TopBottomPanel::bottom("output")
            .resizable(false)
            .default_height(120.0)
            .show(ctx, |ui| self.render_output(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.render_device(ui, ctx));
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.stop();
    }
}
