//! GUI module - touchscreen front-end for the lamp

mod app;
mod device_ui;
mod lamp;
mod qr;

pub use app::{DeviceApp, HostAction, LAMP_OFF_SVG, LAMP_ON_SVG};
pub use device_ui::{
    ButtonPanel, ButtonState, DeviceController, DeviceImage, DeviceUi, OutputKind, OutputLine,
    OutputLog, UiButton,
};
pub use lamp::{LampUi, LampWorker};
pub use qr::{generate_qr_image, QrCache};
