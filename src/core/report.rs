use crate::core::zones::ZoneStore;
use crate::domain::model::StreetRecord;
use crate::utils::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct SectionStats {
    pub id: String,
    pub name: String,
    pub street_count: usize,
    pub streets: Vec<String>,
}

/// Street counts per section, in zone table order, plus what is still unassigned.
#[derive(Debug, Clone, Serialize)]
pub struct SectionReport {
    pub sections: Vec<SectionStats>,
    /// Streets pointing at an id the zone table does not know.
    pub unknown: Vec<(String, String)>,
    pub unassigned: Vec<String>,
    pub total: usize,
}

impl SectionReport {
    pub fn build(streets: &[StreetRecord], zones: &ZoneStore) -> Self {
        let mut by_section: HashMap<&str, Vec<String>> = HashMap::new();
        let mut unassigned = Vec::new();
        for street in streets {
            match &street.section {
                Some(id) => by_section.entry(id).or_default().push(street.name.clone()),
                None => unassigned.push(street.name.clone()),
            }
        }

        let sections: Vec<SectionStats> = zones
            .all_sections()
            .iter()
            .map(|s| {
                let mut names = by_section.remove(s.id.as_str()).unwrap_or_default();
                names.sort();
                SectionStats {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    street_count: names.len(),
                    streets: names,
                }
            })
            .collect();

        let mut unknown: Vec<(String, String)> = by_section
            .into_iter()
            .flat_map(|(id, names)| names.into_iter().map(move |n| (id.to_string(), n)))
            .collect();
        unknown.sort();
        unassigned.sort();

        Self {
            sections,
            unknown,
            unassigned,
            total: streets.len(),
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["section_id", "section_name", "street_count"])?;
        for s in &self.sections {
            wtr.write_record([
                s.id.as_str(),
                s.name.as_str(),
                s.street_count.to_string().as_str(),
            ])?;
        }
        wtr.write_record([
            "",
            "(unassigned)",
            self.unassigned.len().to_string().as_str(),
        ])?;
        wtr.flush()?;
        Ok(())
    }
}
