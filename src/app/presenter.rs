//! Status screen rendering.
//!
//! Six 10-pixel text rows on the 128x64 panel:
//!
//! ```text
//! Temp: 26.0 C
//! Hum : 71.0 %
//! ADC : 2048
//! PPM : 45.65 PPM
//! Pred: 30ppm        (or "Pred: --" when this cycle has no prediction)
//! Fan : ON (3)
//! ```
//!
//! Absent values render as `--`, never as a stale number.

use core::fmt::Write as _;

use crate::control::hysteresis::FanState;
use crate::error::DisplayError;
use crate::prediction::Prediction;

use super::ports::DisplayPort;
use super::reading::Reading;

pub const LINE_HEIGHT: i32 = 10;
pub const MAX_LINES: usize = 6;

/// One row of text; 21 glyphs fit a 128 px row at 6 px per glyph.
pub type Line = heapless::String<24>;

/// Everything the screen shows for one cycle.
#[derive(Debug, Clone, Copy)]
pub struct StatusView {
    /// `None` when the gas sensor could not be read at all.
    pub reading: Option<Reading>,
    pub prediction: Option<Prediction>,
    pub fan: FanState,
}

/// Build the text rows without touching the display.
pub fn status_lines(view: &StatusView) -> heapless::Vec<Line, MAX_LINES> {
    let reading = view.reading.as_ref();
    let mut lines = heapless::Vec::new();

    let mut temp = Line::new();
    let _ = match reading.and_then(|r| r.temperature) {
        Some(t) => write!(temp, "Temp: {t:.1} C"),
        None => write!(temp, "Temp: -- C"),
    };

    let mut hum = Line::new();
    let _ = match reading.and_then(|r| r.humidity) {
        Some(h) => write!(hum, "Hum : {h:.1} %"),
        None => write!(hum, "Hum : -- %"),
    };

    let mut adc = Line::new();
    let raw_adc = reading.and_then(|r| r.raw_adc);
    let _ = match raw_adc {
        Some(raw) => write!(adc, "ADC : {raw}"),
        None => write!(adc, "ADC : ERR"),
    };

    // A sample that failed estimation is an error; no sample at all is not.
    let mut ppm = Line::new();
    let _ = match (raw_adc, reading.and_then(|r| r.concentration_ppm)) {
        (_, Some(value)) => write!(ppm, "PPM : {value:.2} PPM"),
        (Some(_), None) => write!(ppm, "PPM : ERR"),
        (None, None) => write!(ppm, "PPM : --"),
    };

    let mut pred = Line::new();
    let _ = match view.prediction {
        Some(p) => write!(pred, "Pred: {}ppm", p.predicted_ppm.trunc() as i64),
        None => write!(pred, "Pred: --"),
    };

    let mut fan = Line::new();
    let _ = if view.fan.fan_on {
        write!(fan, "Fan : ON ({})", view.fan.cooldown_remaining)
    } else {
        write!(fan, "Fan : OFF")
    };

    for line in [temp, hum, adc, ppm, pred, fan] {
        let _ = lines.push(line);
    }
    lines
}

/// Clear, draw every row, flush.
pub fn render(display: &mut impl DisplayPort, view: &StatusView) -> Result<(), DisplayError> {
    display.clear();
    let mut y = 0;
    for line in status_lines(view) {
        display.write_line(&line, 0, y)?;
        y += LINE_HEIGHT;
    }
    display.flush()
}
