//! Inline keyboard rendering for acknowledge actions.

use altawater_delivery::AcknowledgeAction;

use crate::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const ACKNOWLEDGE_PREFIX: &str = "delivered";
pub const ACKNOWLEDGE_LABEL: &str = "✅ Delivered";

/// Telegram rejects callback data longer than this many bytes.
pub const MAX_CALLBACK_DATA: usize = 64;

pub fn callback_data(action: &AcknowledgeAction) -> String {
    format!("{ACKNOWLEDGE_PREFIX}:{}", action.unit)
}

/// The unit named by acknowledge callback data, if `data` is one.
pub fn parse_callback_data(data: &str) -> Option<&str> {
    match data.split_once(':') {
        Some((ACKNOWLEDGE_PREFIX, unit)) => Some(unit),
        _ => None,
    }
}

/// Longest unit identifier that still fits into the callback data.
pub const fn max_unit_len() -> usize {
    MAX_CALLBACK_DATA - ACKNOWLEDGE_PREFIX.len() - 1
}

pub fn acknowledge_markup(action: &AcknowledgeAction) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![InlineKeyboardButton {
            text: ACKNOWLEDGE_LABEL.to_string(),
            callback_data: callback_data(action),
        }]],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use altawater_delivery::UnitId;

    fn action(unit: &str) -> AcknowledgeAction {
        AcknowledgeAction {
            unit: UnitId::parse(unit).expect("valid unit"),
        }
    }

    #[test]
    fn markup_has_single_delivered_button() {
        let markup = acknowledge_markup(&action("7"));
        assert_eq!(markup.inline_keyboard.len(), 1);
        assert_eq!(markup.inline_keyboard[0][0].text, "✅ Delivered");
        assert_eq!(markup.inline_keyboard[0][0].callback_data, "delivered:7");
    }

    #[test]
    fn callback_data_keeps_colons_in_unit() {
        let data = callback_data(&action("B:12"));
        assert_eq!(parse_callback_data(&data), Some("B:12"));
    }

    #[test]
    fn foreign_callback_data_is_ignored() {
        assert_eq!(parse_callback_data("other:7"), None);
        assert_eq!(parse_callback_data("delivered"), None);
    }

    #[test]
    fn max_unit_fits_callback_limit() {
        let unit = "9".repeat(max_unit_len());
        assert_eq!(callback_data(&action(&unit)).len(), MAX_CALLBACK_DATA);
    }
}
