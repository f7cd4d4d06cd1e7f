use crate::domain::review::Review;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct ReviewRecord<'a> {
    id: Option<u64>,
    pos: u64,
    author: u64,
    approval_count: u32,
    approved: bool,
    text: &'a str,
}

impl<'a> From<&'a Review> for ReviewRecord<'a> {
    fn from(review: &'a Review) -> Self {
        Self {
            id: review.id.map(u64::from),
            pos: review.pos_id.into(),
            author: review.author_id.into(),
            approval_count: review.approval_count,
            approved: review.approved,
            text: &review.text,
        }
    }
}

/// Writes reviews as CSV rows `id,pos,author,approval_count,approved,text`.
pub struct ReviewWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReviewWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    /// Writes the header followed by one row per review, then flushes.
    pub fn write_reviews<'a>(
        &mut self,
        reviews: impl IntoIterator<Item = &'a Review>,
    ) -> Result<()> {
        self.writer.write_record([
            "id",
            "pos",
            "author",
            "approval_count",
            "approved",
            "text",
        ])?;
        for review in reviews {
            self.writer.serialize(ReviewRecord::from(review))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
