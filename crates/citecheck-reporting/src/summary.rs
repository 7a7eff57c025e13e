use std::collections::BTreeMap;

use serde::Serialize;

use citecheck_core::SourceRecord;

/// Aggregate counts over one checked reference list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub min_year: i32,
    pub total: usize,
    pub cited: usize,
    pub missing: usize,
    /// Dated sources older than `min_year`.
    pub outdated: usize,
    /// Sources with no recognizable publication year.
    pub undated: usize,
}

impl ReportSummary {
    pub fn from_records(records: &[SourceRecord], min_year: i32) -> Self {
        let cited = records.iter().filter(|r| r.has_links()).count();
        Self {
            min_year,
            total: records.len(),
            cited,
            missing: records.len() - cited,
            outdated: records
                .iter()
                .filter(|r| r.is_modern == Some(false))
                .count(),
            undated: records.iter().filter(|r| r.year.is_none()).count(),
        }
    }

    /// Share of sources never cited, as a percentage of the list.
    pub fn missing_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.missing as f64 / self.total as f64 * 100.0
        }
    }
}

/// Number of sources per publication year, undated sources left out.
pub fn year_histogram(records: &[SourceRecord]) -> BTreeMap<i32, usize> {
    let mut histogram = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.year) {
        *histogram.entry(year).or_insert(0) += 1;
    }
    histogram
}

/// Report lines for sources the body never cites.
pub fn missing_lines(records: &[SourceRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| !r.has_links())
        .map(SourceRecord::display_line)
        .collect()
}

/// Report lines for sources published before the threshold.
pub fn outdated_lines(records: &[SourceRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| r.is_modern == Some(false))
        .map(SourceRecord::display_line)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<SourceRecord> {
        let mut a = SourceRecord::new(1, "Иванов И.П. Книга. 2005");
        a.year = Some(2005);
        a.links = vec!["см. [1]".to_string()];
        a.apply_threshold(2010);

        let mut b = SourceRecord::new(2, "Петров А.С. Статья. 2015");
        b.year = Some(2015);
        b.apply_threshold(2010);

        let mut c = SourceRecord::new(3, "Федеральный закон № 152-ФЗ");
        c.apply_threshold(2010);

        let mut d = SourceRecord::new(4, "Сидоров С.С. Обзор. 2005");
        d.year = Some(2005);
        d.apply_threshold(2010);

        vec![a, b, c, d]
    }

    #[test]
    fn test_summary_counts() {
        let s = ReportSummary::from_records(&sample(), 2010);
        assert_eq!(s.total, 4);
        assert_eq!(s.cited, 1);
        assert_eq!(s.missing, 3);
        assert_eq!(s.outdated, 2);
        assert_eq!(s.undated, 1);
        assert!((s.missing_pct() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_summary() {
        let s = ReportSummary::from_records(&[], 2010);
        assert_eq!(s.total, 0);
        assert_eq!(s.missing_pct(), 0.0);
    }

    #[test]
    fn test_year_histogram() {
        let h = year_histogram(&sample());
        assert_eq!(h.get(&2005), Some(&2));
        assert_eq!(h.get(&2015), Some(&1));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_lines() {
        let records = sample();
        assert_eq!(
            missing_lines(&records),
            vec![
                "2. Петров А.С. Статья. 2015",
                "3. Федеральный закон № 152-ФЗ",
                "4. Сидоров С.С. Обзор. 2005",
            ]
        );
        assert_eq!(
            outdated_lines(&records),
            vec!["1. Иванов И.П. Книга. 2005", "4. Сидоров С.С. Обзор. 2005"]
        );
    }
}
