//! Ordered collections of encoded lines.
//!
//! A [`Batch`] lives for one write call: points are encoded into it, it is
//! handed to a [`BatchWriter`](crate::writer::BatchWriter), and it is dropped.
//! Points that fail to encode contribute nothing, not even a blank line.

use std::ops::Index;

use crate::encoder::{self, EncodeOptions, EncodedLine};
use crate::error::EncodeError;
use crate::point::Point;

/// An ordered sequence of encoded lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    lines: Vec<EncodedLine>,
}

/// A point that produced no line.
#[derive(Debug)]
pub struct DroppedPoint {
    /// Position of the point in the encoded input.
    pub index: usize,
    /// Why it was dropped.
    pub error: EncodeError,
}

/// Outcome of [`Batch::encode_points`].
#[derive(Debug, Default)]
pub struct EncodeReport {
    /// Lines of the points that encoded, in input order.
    pub batch: Batch,
    /// Points that produced no line.
    pub dropped: Vec<DroppedPoint>,
    /// Total tags dropped for empty values across all points.
    pub rejected_tags: usize,
    /// Total fields dropped for empty values across all points.
    pub skipped_fields: usize,
}

impl Batch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `points` in order, collecting their lines into a batch.
    ///
    /// Encoding failures never abort the batch; each failing point is logged
    /// at `warn` level and listed in [`EncodeReport::dropped`].
    pub fn encode_points<'a, I>(points: I, options: &EncodeOptions) -> EncodeReport
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut report = EncodeReport::default();

        for (index, point) in points.into_iter().enumerate() {
            match encoder::encode(point, options) {
                Ok(encoded) => {
                    report.rejected_tags += encoded.rejected_tags.len();
                    report.skipped_fields += encoded.skipped_fields.len();
                    report.batch.push(encoded.line);
                }
                Err(error) => {
                    tracing::warn!(
                        index,
                        measurement = point.measurement(),
                        %error,
                        "dropping point"
                    );
                    report.dropped.push(DroppedPoint { index, error });
                }
            }
        }

        report
    }

    /// Appends a line.
    pub fn push(&mut self, line: EncodedLine) {
        self.lines.push(line);
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the batch holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over the lines in order.
    pub fn iter(&self) -> std::slice::Iter<'_, EncodedLine> {
        self.lines.iter()
    }

    /// Returns the lines as a slice.
    pub fn lines(&self) -> &[EncodedLine] {
        &self.lines
    }

    /// Joins all lines with a single `\n`, with no trailing newline.
    pub fn to_body(&self) -> String {
        let len = self.lines.iter().map(|l| l.len() + 1).sum::<usize>();
        let mut body = String::with_capacity(len);
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                body.push('\n');
            }
            body.push_str(line.as_str());
        }
        body
    }
}

impl Index<usize> for Batch {
    type Output = EncodedLine;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lines[index]
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a EncodedLine;
    type IntoIter = std::slice::Iter<'a, EncodedLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl IntoIterator for Batch {
    type Item = EncodedLine;
    type IntoIter = std::vec::IntoIter<EncodedLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl FromIterator<EncodedLine> for Batch {
    fn from_iter<T: IntoIterator<Item = EncodedLine>>(iter: T) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl Extend<EncodedLine> for Batch {
    fn extend<T: IntoIterator<Item = EncodedLine>>(&mut self, iter: T) {
        self.lines.extend(iter);
    }
}
