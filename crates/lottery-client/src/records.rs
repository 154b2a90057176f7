//! Line-oriented bet record source.
//!
//! Each input line carries exactly 5 comma-separated fields:
//! first name, last name, document, birth date, number. The agency
//! id is not part of the file; it comes from configuration and is
//! stamped onto every record.
//!
//! Malformed lines (wrong field count, empty field) are skipped with
//! a warning, never fatal. Field values must not contain `,` or `=`
//! because the wire encoding does not escape them; such lines are
//! rejected here.

use std::io::BufRead;

use tracing::warn;

use lottery_core::Bet;

const FIELDS_PER_RECORD: usize = 5;

/// Iterator over the bets in a line-oriented record stream.
pub struct BetRecordSource<R> {
    reader: R,
    agency_id: String,
    line_no: usize,
}

impl<R: BufRead> BetRecordSource<R> {
    pub fn new(reader: R, agency_id: String) -> Self {
        Self {
            reader,
            agency_id,
            line_no: 0,
        }
    }

    fn parse_line(&self, line: &str) -> Option<Bet> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        if fields.len() != FIELDS_PER_RECORD {
            warn!(
                action = "parse_record",
                result = "skip",
                line = self.line_no,
                fields = fields.len(),
                expected = FIELDS_PER_RECORD,
            );
            return None;
        }

        if fields.iter().any(|f| f.is_empty()) {
            warn!(
                action = "parse_record",
                result = "skip",
                line = self.line_no,
                error = "empty field",
            );
            return None;
        }

        if fields.iter().any(|f| f.contains('=')) {
            warn!(
                action = "parse_record",
                result = "skip",
                line = self.line_no,
                error = "field contains '='",
            );
            return None;
        }

        Some(Bet {
            agency_id: self.agency_id.clone(),
            first_name: fields[0].to_string(),
            last_name: fields[1].to_string(),
            document: fields[2].to_string(),
            birth_date: fields[3].to_string(),
            number: fields[4].to_string(),
        })
    }
}

impl<R: BufRead> Iterator for BetRecordSource<R> {
    type Item = Bet;

    fn next(&mut self) -> Option<Bet> {
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => {
                    warn!(action = "read_record", result = "fail", error = %err);
                    return None;
                }
            }
            self.line_no += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(bet) = self.parse_line(line) {
                return Some(bet);
            }
        }
    }
}
