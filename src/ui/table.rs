use tabled::{settings::Style, Table, Tabled};
use crate::chemical::ChemicalRecord;
use crate::exposure::ExposureLimitRecord;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct ChemicalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "English")]
    name_en: String,
    #[tabled(rename = "CAS")]
    cas: String,
    #[tabled(rename = "UN")]
    un_number: String,
    #[tabled(rename = "Formula")]
    formula: String,
}

#[derive(Tabled)]
struct ExposureLimitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "CAS")]
    cas: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "PC-TWA")]
    pc_twa: String,
    #[tabled(rename = "PC-STEL")]
    pc_stel: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &[(&str, &str)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

fn number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn chemicals_table(records: &[ChemicalRecord]) -> String {
    let rows: Vec<_> = records
        .iter()
        .map(|r| ChemicalRow {
            id: r.id.map(|id| id.to_string()).unwrap_or_default(),
            name: r.name.clone(),
            name_en: text(r.name_en.as_deref()),
            cas: text(r.cas.as_deref()),
            un_number: text(r.un_number.as_deref()),
            formula: text(r.formula.as_deref()),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn exposure_limits_table(records: &[ExposureLimitRecord]) -> String {
    let rows: Vec<_> = records
        .iter()
        .map(|r| {
            let mut flags = Vec::new();
            if r.skin_absorption {
                flags.push("skin".to_string());
            }
            if r.sensitizer {
                flags.push("sensitizer".to_string());
            }
            if let Some(code) = &r.carcinogen {
                flags.push(code.clone());
            }
            ExposureLimitRow {
                id: r.id.map(|id| id.to_string()).unwrap_or_default(),
                name: r.name.clone(),
                cas: text(r.cas.as_deref()),
                mac: number(r.mac),
                pc_twa: number(r.pc_twa),
                pc_stel: number(r.pc_stel),
                flags: flags.join(", "),
            }
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
