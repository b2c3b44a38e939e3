use std::io::Write;

use rnaqc_core::models::DefaultMap;

use crate::consts::FILTERED_BY_TAG_PREFIX;

/// Report rows printed after the chimeric read count, in order.
pub const REPORT_KEYS: [&str; 31] = [
    "Duplicate Reads",
    "End 1 Antisense",
    "End 2 Antisense",
    "End 1 Bases",
    "End 2 Bases",
    "End 1 Mapped Reads",
    "End 2 Mapped Reads",
    "End 1 Mismatches",
    "End 2 Mismatches",
    "End 1 Sense",
    "End 2 Sense",
    "Exonic Reads",
    "Failed Vendor QC",
    "Intergenic Reads",
    "Intragenic Reads",
    "Intron/Exon Disqualified Reads",
    "Intronic Reads",
    "Low quality reads",
    "Mapped Duplicate Reads",
    "Mapped Reads",
    "Mapped Unique Reads",
    "Mismatched Bases",
    "Reads excluded from exon counts",
    "Reads used for Intron/Exon counts",
    "rRNA Reads",
    "Split Reads",
    "Total Bases",
    "Total Mapped Pairs",
    "Total Reads",
    "Unique Mapping, Vendor QC Passed Reads",
    "Unpaired Reads",
];

///
/// Named counters for the run summary.
///
#[derive(Debug, Default)]
pub struct Metrics {
    counter: DefaultMap<u64>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: &str) {
        self.increment_by(key, 1);
    }

    pub fn increment_by(&mut self, key: &str, n: u64) {
        *self.counter.entry_or_default(key) += n;
    }

    pub fn get(&self, key: &str) -> u64 {
        self.counter.value(key)
    }

    /// `a / b`; a zero denominator gives NaN or infinity.
    pub fn frac(&self, a: &str, b: &str) -> f64 {
        self.get(a) as f64 / self.get(b) as f64
    }

    ///
    /// Write the tab separated metrics report.
    ///
    /// Chimeric reads come from the tag based count when there is one, from the
    /// contig based count otherwise. Every `Filtered by tag: <tag>` counter is
    /// appended at the end.
    ///
    pub fn write_report<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(
            writer,
            "Alternative Alignments\t{}",
            self.get("Alternative Alignments")
        )?;

        let chimeric = match self.get("Chimeric Reads_tag") {
            0 => self.get("Chimeric Reads_contig"),
            n => n,
        };
        writeln!(writer, "Chimeric Reads\t{}", chimeric)?;

        for key in REPORT_KEYS {
            writeln!(writer, "{}\t{}", key, self.get(key))?;
        }

        for key in self.counter.sorted_keys() {
            if key.len() > FILTERED_BY_TAG_PREFIX.len() && key.starts_with(FILTERED_BY_TAG_PREFIX)
            {
                writeln!(writer, "{}\t{}", key, self.get(key))?;
            }
        }

        Ok(())
    }
}
