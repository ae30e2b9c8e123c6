//! CSV export of a scoreboard.
//!
//! The layout matches the spreadsheet backend: a `Participant` header
//! followed by one column per category, then one row per participant.

use tally_types::Scoreboard;

/// Encode `board` as CSV bytes.
///
/// # Errors
///
/// Returns a [`csv::Error`] if a record cannot be written.
pub fn board_csv(board: &Scoreboard) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let header = std::iter::once("Participant").chain(board.categories().iter().map(|c| c.name()));
    writer.write_record(header)?;

    for participant in board.participants() {
        let totals = board
            .categories()
            .iter()
            .map(|c| c.total(participant).unwrap_or(0).to_string());
        writer.write_record(std::iter::once(participant.clone()).chain(totals))?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_then_one_row_per_participant() {
        let mut board = Scoreboard::new(["Ana", "Ben, Jr."], ["prospecting", "recruitment"]);
        assert!(board.add_points("recruitment", "Ana", 5).is_ok());
        assert!(board.add_points("prospecting", "Ben, Jr.", -1).is_ok());

        let bytes = board_csv(&board).unwrap_or_default();
        let text = String::from_utf8(bytes).unwrap_or_default();
        assert_eq!(
            text,
            "Participant,prospecting,recruitment\nAna,0,5\n\"Ben, Jr.\",-1,0\n"
        );
    }

    #[test]
    fn empty_board_is_just_a_header() {
        let board = Scoreboard::new(std::iter::empty::<&str>(), ["calls"]);
        let text = String::from_utf8(board_csv(&board).unwrap_or_default()).unwrap_or_default();
        assert_eq!(text, "Participant,calls\n");
    }
}
