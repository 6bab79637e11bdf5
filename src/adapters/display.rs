//! Status display adapters.
//!
//! - **`target_os = "espidf"`**: [`OledDisplay`], an SSD1306 128x64 panel
//!   over I2C drawn with the 6x10 ASCII font.
//! - **all targets**: [`TextFrame`], an in-memory line buffer used for
//!   host simulation and tests.

use log::debug;

use crate::app::ports::DisplayPort;
use crate::error::DisplayError;
use crate::pins::{OLED_HEIGHT, OLED_WIDTH};

/// Text must start on the panel.
fn check_origin(x: i32, y: i32) -> Result<(), DisplayError> {
    if x < 0 || y < 0 || x >= OLED_WIDTH as i32 || y >= OLED_HEIGHT as i32 {
        return Err(DisplayError::OutOfBounds);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// In-memory frame
// ───────────────────────────────────────────────────────────────

/// A drawn text row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub text: String,
    pub x: i32,
    pub y: i32,
}

/// Double-buffered text frame: rows are drawn into `pending` and become
/// visible on `flush`.
#[derive(Debug, Default)]
pub struct TextFrame {
    pending: Vec<TextRow>,
    shown: Vec<TextRow>,
    flushes: usize,
}

impl TextFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows currently on screen.
    pub fn shown(&self) -> &[TextRow] {
        &self.shown
    }

    /// Text of the rows on screen, top to bottom.
    pub fn shown_text(&self) -> Vec<&str> {
        self.shown.iter().map(|row| row.text.as_str()).collect()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl DisplayPort for TextFrame {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn write_line(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
        check_origin(x, y)?;
        self.pending.push(TextRow {
            text: text.to_owned(),
            x,
            y,
        });
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.shown.clone_from(&self.pending);
        self.flushes += 1;
        debug!("display: {}", self.shown_text().join(" | "));
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// SSD1306 OLED
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use oled::OledDisplay;

#[cfg(target_os = "espidf")]
mod oled {
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::pixelcolor::BinaryColor;
    use embedded_graphics::prelude::*;
    use embedded_graphics::text::{Baseline, Text};
    use embedded_hal::i2c::I2c;
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::{I2CDisplayInterface, Ssd1306};

    use super::check_origin;
    use crate::app::ports::DisplayPort;
    use crate::error::DisplayError;

    type Panel<I2C> =
        Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

    pub struct OledDisplay<I2C> {
        panel: Panel<I2C>,
    }

    impl<I2C: I2c> OledDisplay<I2C> {
        /// Initialise the panel at the default 0x3C address.
        pub fn new(i2c: I2C) -> Result<Self, DisplayError> {
            let interface = I2CDisplayInterface::new(i2c);
            let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();
            panel.init().map_err(|_| DisplayError::Bus)?;
            panel.clear_buffer();
            panel.flush().map_err(|_| DisplayError::Bus)?;
            log::info!("OLED: SSD1306 128x64 ready");
            Ok(Self { panel })
        }
    }

    impl<I2C: I2c> DisplayPort for OledDisplay<I2C> {
        fn clear(&mut self) {
            self.panel.clear_buffer();
        }

        fn write_line(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
            check_origin(x, y)?;
            let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
            Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
                .draw(&mut self.panel)
                .map_err(|_| DisplayError::Bus)?;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), DisplayError> {
            self.panel.flush().map_err(|_| DisplayError::Bus)
        }
    }
}
