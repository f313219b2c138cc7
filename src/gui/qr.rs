//! QR overlay for DPP onboarding
//!
//! A configurator phone scans the bootstrap URI off the touchscreen. The
//! URI only changes when wpa_supplicant generates a new bootstrap key, so a
//! single texture is kept and rebuilt when the URI differs.

use egui::{Color32, ColorImage, TextureHandle};

/// Screen pixels per QR module. Sized for a phone camera at arm's length
const MODULE_PX: usize = 6;

/// Blank modules around the symbol. Scanners want at least 4
const QUIET_ZONE: usize = 4;

/// Texture for the currently shown bootstrap URI
#[derive(Default)]
pub struct QrCache {
    current: Option<(String, TextureHandle)>,
}

impl QrCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for `uri`, or `None` if the URI is too long for a QR code
    pub fn get_or_create(&mut self, ctx: &egui::Context, uri: &str) -> Option<&TextureHandle> {
        let stale = self.current.as_ref().map_or(true, |(cached, _)| cached != uri);
        if stale {
            let image = generate_qr_image(uri)?;
            let texture = ctx.load_texture("dpp-qr", image, egui::TextureOptions::NEAREST);
            self.current = Some((uri.to_string(), texture));
        }
        self.current.as_ref().map(|(_, texture)| texture)
    }
}

/// Encode a DPP URI as a black-on-white image with a quiet zone
pub fn generate_qr_image(uri: &str) -> Option<ColorImage> {
    // DPP URIs are mostly base64 key material; Medium keeps them at a
    // version scanners read reliably from a small screen
    let qr = qrcodegen::QrCode::encode_text(uri, qrcodegen::QrCodeEcc::Medium).ok()?;

    let modules = qr.size() as usize + 2 * QUIET_ZONE;
    let side = modules * MODULE_PX;
    let mut image = ColorImage::new([side, side], Color32::WHITE);

    for (i, pixel) in image.pixels.iter_mut().enumerate() {
        let module_x = (i % side) / MODULE_PX;
        let module_y = (i / side) / MODULE_PX;
        let x = module_x as i32 - QUIET_ZONE as i32;
        let y = module_y as i32 - QUIET_ZONE as i32;
        // get_module is false outside the symbol
        if qr.get_module(x, y) {
            *pixel = Color32::BLACK;
        }
    }

    Some(image)
}
