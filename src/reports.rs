use crate::types::{
    CropProduction, CropRow, CropSummary, Overview, Record, YearlyRow, YearlySummary,
};
use crate::util::{average, format_number, short_year_label, year_key};
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Group `records` by `key`, keeping groups in first-seen order.
///
/// Every key gets a group even when `pick` rejects all of its records, so
/// callers decide what an empty group means.
fn partition<'a, K, T>(
    records: &'a [Record],
    key: K,
    pick: impl Fn(&'a Record) -> Option<T>,
) -> Vec<(&'a str, Vec<T>)>
where
    K: Fn(&'a Record) -> &'a str,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<T>)> = Vec::new();
    for r in records {
        let k = key(r);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        if let Some(item) = pick(r) {
            groups[slot].1.push(item);
        }
    }
    groups
}

fn crop_production(name: &str, production: f64) -> CropProduction {
    CropProduction {
        name: if name.is_empty() {
            "N/A".to_string()
        } else {
            name.to_string()
        },
        production,
    }
}

/// Highest and lowest production crop per financial year, ordered by year.
pub fn summarize_by_year(records: &[Record]) -> Vec<YearlySummary> {
    let groups = partition(
        records,
        |r| r.year.as_str(),
        |r| r.production.value().map(|p| (r.crop_name.as_str(), p)),
    );

    let mut summaries: Vec<YearlySummary> = groups
        .into_iter()
        .map(|(year, mut crops)| {
            // Stable: equal maxima keep input order at the front, equal
            // minima keep input order at the back.
            crops.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
            let max_crop = crops
                .first()
                .map(|(name, p)| crop_production(name, *p))
                .unwrap_or_else(CropProduction::placeholder);
            let min_crop = crops
                .last()
                .map(|(name, p)| crop_production(name, *p))
                .unwrap_or_else(CropProduction::placeholder);
            YearlySummary {
                year: year.to_string(),
                max_crop,
                min_crop,
            }
        })
        .collect();

    summaries.sort_by(|a, b| year_key(&a.year).cmp(year_key(&b.year)));
    summaries
}

/// Average yield and cultivation area per crop, highest average yield first.
///
/// Only records with both a yield and a cultivation area count; crops left
/// with nothing are dropped.
pub fn summarize_by_crop(records: &[Record]) -> Vec<CropSummary> {
    let groups = partition(
        records,
        |r| r.crop_name.as_str(),
        |r| match (r.crop_yield.value(), r.cultivation_area.value()) {
            (Some(y), Some(a)) => Some((y, a)),
            _ => None,
        },
    );

    let mut summaries: Vec<CropSummary> = groups
        .into_iter()
        .filter(|(_, samples)| !samples.is_empty())
        .map(|(crop_name, samples)| {
            let yields: Vec<f64> = samples.iter().map(|(y, _)| *y).collect();
            let areas: Vec<f64> = samples.iter().map(|(_, a)| *a).collect();
            CropSummary {
                crop_name: crop_name.to_string(),
                average_yield: average(&yields),
                average_cultivation: average(&areas),
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.average_yield
            .partial_cmp(&a.average_yield)
            .unwrap_or(Ordering::Equal)
    });
    summaries
}

pub fn generate_overview(
    records: &[Record],
    years: &[YearlySummary],
    crops: &[CropSummary],
) -> Overview {
    let keys: Vec<&str> = years
        .iter()
        .map(|y| year_key(&y.year))
        .filter(|k| !k.is_empty())
        .collect();
    Overview {
        total_records: records.len(),
        financial_years: years.len(),
        crops_analyzed: crops.len(),
        period_start: keys.iter().min().map(|k| k.to_string()),
        period_end: keys.iter().max().map(|k| k.to_string()),
        generated_at: Utc::now(),
    }
}

pub fn yearly_rows(summaries: &[YearlySummary]) -> Vec<YearlyRow> {
    summaries
        .iter()
        .map(|s| YearlyRow {
            financial_year: short_year_label(&s.year).to_string(),
            highest_crop: s.max_crop.name.clone(),
            highest_production: format!("{} t", format_number(s.max_crop.production, 3)),
            lowest_crop: s.min_crop.name.clone(),
            lowest_production: format!("{} t", format_number(s.min_crop.production, 3)),
        })
        .collect()
}

pub fn crop_rows(summaries: &[CropSummary]) -> Vec<CropRow> {
    summaries
        .iter()
        .map(|s| CropRow {
            crop_name: s.crop_name.clone(),
            average_yield: format_number(s.average_yield, 2),
            average_cultivation: format_number(s.average_cultivation, 2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Measure;
    use std::collections::HashSet;

    fn rec(year: &str, crop: &str, production: &str, yld: &str, area: &str) -> Record {
        Record {
            year: year.to_string(),
            crop_name: crop.to_string(),
            production: Measure::from_cell(production),
            crop_yield: Measure::from_cell(yld),
            cultivation_area: Measure::from_cell(area),
        }
    }

    fn prod(year: &str, crop: &str, production: &str) -> Record {
        rec(year, crop, production, "", "")
    }

    fn sample() -> Vec<Record> {
        vec![
            rec("Financial Year (Apr - Mar), 2002-2003", "Rice", "71820000", "1744", "41180000"),
            rec("Financial Year (Apr - Mar), 2002-2003", "Jowar", "7010000", "", "9330000"),
            rec("Financial Year (Apr - Mar), 2001-2002", "Rice", "93340000", "2079", "44900000"),
            rec("Financial Year (Apr - Mar), 2001-2002", "Wheat", "72770000", "2762", "26340000"),
            rec("Financial Year (Apr - Mar), 2001-2002", "Bajra", "", "", ""),
            rec("Financial Year (Apr - Mar), 2000-2001", "Bajra", "", "688", ""),
            rec("Year unknown", "Wheat", "65760000", "2610", "25730000"),
        ]
    }

    #[test]
    fn yearly_two_records_pick_max_and_min() {
        let records = vec![prod("FY 2001-2002", "Rice", "100"), prod("FY 2001-2002", "Wheat", "50")];
        let out = summarize_by_year(&records);
        assert_eq!(
            out,
            vec![YearlySummary {
                year: "FY 2001-2002".to_string(),
                max_crop: CropProduction { name: "Rice".into(), production: 100.0 },
                min_crop: CropProduction { name: "Wheat".into(), production: 50.0 },
            }]
        );
    }

    #[test]
    fn yearly_empty_partition_gets_placeholder() {
        let out = summarize_by_year(&[prod("FY 1999-2000", "Rice", "")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].year, "FY 1999-2000");
        assert_eq!(out[0].max_crop, CropProduction::placeholder());
        assert_eq!(out[0].min_crop, CropProduction::placeholder());
    }

    #[test]
    fn yearly_single_record_is_both_max_and_min() {
        let out = summarize_by_year(&[prod("FY 2010-2011", "Maize", "21730000")]);
        assert_eq!(out[0].max_crop, out[0].min_crop);
        assert_eq!(out[0].max_crop.name, "Maize");
    }

    #[test]
    fn yearly_ties_follow_input_order() {
        let records = vec![
            prod("FY 2005-2006", "A", "10"),
            prod("FY 2005-2006", "B", "10"),
            prod("FY 2005-2006", "C", "1"),
            prod("FY 2005-2006", "D", "1"),
        ];
        let out = summarize_by_year(&records);
        assert_eq!(out[0].max_crop.name, "A");
        assert_eq!(out[0].min_crop.name, "D");
    }

    #[test]
    fn yearly_unparseable_production_counts_as_zero() {
        let records = vec![prod("FY 2005-2006", "Rice", "500"), prod("FY 2005-2006", "Sugarcane", "n/a")];
        let out = summarize_by_year(&records);
        assert_eq!(out[0].min_crop, CropProduction { name: "Sugarcane".into(), production: 0.0 });
    }

    #[test]
    fn yearly_blank_crop_name_shows_na() {
        let out = summarize_by_year(&[prod("FY 2005-2006", "", "12")]);
        assert_eq!(out[0].max_crop.name, "N/A");
        assert_eq!(out[0].max_crop.production, 12.0);
    }

    #[test]
    fn yearly_one_entry_per_distinct_year_sorted_by_year_key() {
        let records = sample();
        let out = summarize_by_year(&records);
        let distinct: HashSet<&str> = records.iter().map(|r| r.year.as_str()).collect();
        assert_eq!(out.len(), distinct.len());

        let keys: Vec<&str> = out.iter().map(|s| year_key(&s.year)).collect();
        assert_eq!(keys, vec!["", "2000", "2001", "2002"]);
        for w in keys.windows(2) {
            assert!(w[0] <= w[1]);
        }
        for s in &out {
            assert!(s.max_crop.production >= s.min_crop.production);
        }
        // 2000-2001 only has a Bajra row without production.
        assert_eq!(out[1].max_crop, CropProduction::placeholder());
        assert_eq!(out[2].max_crop.name, "Rice");
        assert_eq!(out[2].min_crop.name, "Wheat");
    }

    #[test]
    fn yearly_equal_year_keys_keep_first_seen_order() {
        let records = vec![
            prod("Kharif 2001", "Rice", "1"),
            prod("Rabi 2001", "Wheat", "1"),
            prod("1998-1999", "Rice", "1"),
        ];
        let years: Vec<String> = summarize_by_year(&records).into_iter().map(|s| s.year).collect();
        assert_eq!(years, vec!["1998-1999", "Kharif 2001", "Rabi 2001"]);
    }

    #[test]
    fn labels_without_ascii_digits_sort_first() {
        let records = vec![prod("FY 2001-2002", "Rice", "1"), prod("वर्ष २००१", "Wheat", "1")];
        let years: Vec<String> = summarize_by_year(&records).into_iter().map(|s| s.year).collect();
        assert_eq!(years, vec!["वर्ष २००१", "FY 2001-2002"]);

        let summaries = summarize_by_year(&records);
        let overview = generate_overview(&records, &summaries, &[]);
        assert_eq!(overview.period_start.as_deref(), Some("2001"));
        assert_eq!(overview.period_end.as_deref(), Some("2001"));
    }

    #[test]
    fn crop_averages_only_complete_records() {
        let out = summarize_by_crop(&sample());
        let names: Vec<&str> = out.iter().map(|c| c.crop_name.as_str()).collect();
        // Jowar lacks yield, Bajra never has both values.
        assert_eq!(names, vec!["Wheat", "Rice"]);

        let wheat = &out[0];
        assert_eq!(wheat.average_yield, (2762.0 + 2610.0) / 2.0);
        assert_eq!(wheat.average_cultivation, (26340000.0 + 25730000.0) / 2.0);
        let rice = &out[1];
        assert_eq!(rice.average_yield, (1744.0 + 2079.0) / 2.0);
    }

    #[test]
    fn crop_sorted_non_increasing_with_stable_ties() {
        let records = vec![
            rec("FY", "Gram", "", "900", "1"),
            rec("FY", "Tur", "", "700", "1"),
            rec("FY", "Urad", "", "900", "1"),
            rec("FY", "Moong", "", "x", "1"),
        ];
        let out = summarize_by_crop(&records);
        let names: Vec<&str> = out.iter().map(|c| c.crop_name.as_str()).collect();
        assert_eq!(names, vec!["Gram", "Urad", "Tur", "Moong"]);
        for w in out.windows(2) {
            assert!(w[0].average_yield >= w[1].average_yield);
        }
        assert_eq!(out[3].average_yield, 0.0);
    }

    #[test]
    fn empty_input_gives_empty_views() {
        assert!(summarize_by_year(&[]).is_empty());
        assert!(summarize_by_crop(&[]).is_empty());
    }

    #[test]
    fn repeated_calls_are_identical() {
        let records = sample();
        assert_eq!(summarize_by_year(&records), summarize_by_year(&records));
        assert_eq!(summarize_by_crop(&records), summarize_by_crop(&records));
    }

    #[test]
    fn overview_counts_and_period() {
        let records = sample();
        let years = summarize_by_year(&records);
        let crops = summarize_by_crop(&records);
        let overview = generate_overview(&records, &years, &crops);
        assert_eq!(overview.total_records, 7);
        assert_eq!(overview.financial_years, 4);
        assert_eq!(overview.crops_analyzed, 2);
        assert_eq!(overview.period_start.as_deref(), Some("2000"));
        assert_eq!(overview.period_end.as_deref(), Some("2002"));

        let empty = generate_overview(&[], &[], &[]);
        assert_eq!(empty.period_start, None);
    }

    #[test]
    fn rows_are_display_formatted() {
        let records = sample();
        let rows = yearly_rows(&summarize_by_year(&records));
        let fy = &rows[3];
        assert_eq!(fy.financial_year, "2002-2003");
        assert_eq!(fy.highest_crop, "Rice");
        assert_eq!(fy.highest_production, "71,820,000 t");
        assert_eq!(fy.lowest_production, "7,010,000 t");
        assert_eq!(rows[0].financial_year, "Year unknown");

        let crops = crop_rows(&summarize_by_crop(&records));
        assert_eq!(crops[0].average_yield, "2,686");
        assert_eq!(crops[1].average_yield, "1,911.5");
        assert_eq!(crops[1].average_cultivation, "43,040,000");
    }
}
