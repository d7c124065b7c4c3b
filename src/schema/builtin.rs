//! Builtin module definitions.
//!
//! One entry per data-entry module the plant runs today. These are the only
//! schemas the registry is seeded with; adding a module means adding a
//! definition here and nothing else.

use super::{FieldGroup, FieldSchema, FieldType, FormSchema, LocationDimension, LocationOptions};

fn field(key: &str, label: &str, field_type: FieldType) -> FieldSchema {
    FieldSchema::new(key, label, field_type)
}

fn number(key: &str, label: &str) -> FieldSchema {
    field(key, label, FieldType::Number)
}

fn select(key: &str, label: &str, options: &[&str]) -> FieldSchema {
    field(
        key,
        label,
        FieldType::Select {
            options: options.iter().map(|s| s.to_string()).collect(),
        },
    )
}

fn fixed_axis(key: &str, label: &str, options: &[&str]) -> LocationDimension {
    LocationDimension {
        key: key.into(),
        label: label.into(),
        options: LocationOptions::Fixed(options.iter().map(|s| s.to_string()).collect()),
    }
}

fn free_axis(key: &str, label: &str) -> LocationDimension {
    LocationDimension {
        key: key.into(),
        label: label.into(),
        options: LocationOptions::FreeText,
    }
}

fn group(title: &str, keys: &[&str]) -> FieldGroup {
    FieldGroup {
        title: title.into(),
        field_keys: keys.iter().map(|s| s.to_string()).collect(),
    }
}

/// Daily unit performance report. Edit-gated: corrections to a posted day
/// need the shift supervisor's credential.
fn unit_report() -> FormSchema {
    FormSchema {
        id: "unit_report".into(),
        label: "Unit Daily Report".into(),
        fields: vec![
            number("generation_mu", "Generation (MU)"),
            number("plf_pct", "PLF (%)"),
            number("aux_consumption_mu", "Aux Consumption (MU)"),
            number("running_hours", "Running Hours"),
            number("coal_consumption_t", "Coal Consumption (Tons)"),
            number("oil_consumption_kl", "Oil Consumption (KL)"),
            number("heat_rate", "Heat Rate (Kcal/kWh)"),
            field("remarks", "Remarks", FieldType::Textarea),
        ],
        groups: vec![
            group(
                "Performance",
                &["generation_mu", "plf_pct", "aux_consumption_mu", "running_hours"],
            ),
            group(
                "Consumption",
                &["coal_consumption_t", "oil_consumption_kl", "heat_rate", "remarks"],
            ),
        ],
        locations: vec![],
        edit_gated: true,
    }
}

/// Station-level daily report (whole plant, not per unit).
fn station_report() -> FormSchema {
    FormSchema {
        id: "station_report".into(),
        label: "Station Daily Report".into(),
        fields: vec![
            number("station_generation_mu", "Station Generation (MU)"),
            number("export_mu", "Export (MU)"),
            number("plant_availability_pct", "Plant Availability (%)"),
            number("dm_water_consumption_t", "DM Water Consumption (T)"),
            field("remarks", "Remarks", FieldType::Textarea),
        ],
        groups: vec![],
        locations: vec![],
        edit_gated: true,
    }
}

/// Proximate coal analysis, per pims_config.
fn proximate() -> FormSchema {
    FormSchema {
        id: "proximate".into(),
        label: "Proximate Analysis".into(),
        fields: vec![
            field("sampling_date", "Date of Sampling", FieldType::Date),
            field("sampling_time", "Time of Sampling", FieldType::Time),
            select("shift", "Shift", &["A", "B", "C"]),
            field("analysis_date", "Date of Analysis", FieldType::Date),
            number("moisture", "Total Moisture %"),
            number("ash", "Ash %"),
            number("vm", "Volatile Matter %"),
            number("fc", "Fixed Carbon %"),
            number("plus_25mm", "+25mm Size"),
            number("gcv", "GCV (Kcal/kg)"),
            number("uhv", "UHV (Kcal/kg)"),
            field("remarks", "Remarks", FieldType::Textarea),
        ],
        groups: vec![
            group(
                "Sampling",
                &["sampling_date", "sampling_time", "shift", "analysis_date"],
            ),
            group(
                "Analysis Data",
                &["moisture", "ash", "vm", "fc", "plus_25mm", "gcv", "uhv", "remarks"],
            ),
        ],
        locations: vec![
            fixed_axis("plant", "Plant", &["2x125MW", "14MW"]),
            fixed_axis("broad_area", "Broad Area", &["Unit-1", "Unit-2", "14MW"]),
            free_axis("main_area", "Main Area"),
            free_axis("main_collection_area", "Main Collection Area"),
            free_axis("exact_area", "Exact Collection Area"),
        ],
        edit_gated: false,
    }
}

/// Sieve size distribution of crushed coal.
fn sieve() -> FormSchema {
    FormSchema {
        id: "sieve".into(),
        label: "Sieve Analysis".into(),
        fields: vec![
            field("sampling_date", "Date of Sampling", FieldType::Date),
            select("shift", "Shift", &["A", "B", "C"]),
            number("plus_25mm_pct", "+25mm (%)"),
            number("mm_20_25_pct", "20-25mm (%)"),
            number("mm_10_20_pct", "10-20mm (%)"),
            number("mm_6_10_pct", "6-10mm (%)"),
            number("minus_6mm_pct", "-6mm (%)"),
            field("remarks", "Remarks", FieldType::Textarea),
        ],
        groups: vec![],
        locations: vec![
            free_axis("plant", "Plant"),
            free_axis("broad_area", "Broad Area"),
            free_axis("exact_area", "Sample Point"),
        ],
        edit_gated: false,
    }
}

/// Combustion-side operating parameters.
fn combustible() -> FormSchema {
    FormSchema {
        id: "combustible".into(),
        label: "Combustible Analysis".into(),
        fields: vec![
            number("total_coal_flow_tph", "Total Coal Flow (TPH)"),
            number("total_air_flow_tph", "Total Air Flow (TPH)"),
            number("sa_flow_tph", "SA Flow (TPH)"),
            number("o2_pct", "O2 (%)"),
            number("burner_tilt_deg", "Burner Tilt (deg)"),
            number("mw", "MW"),
            number("ba_pct", "BA (%)"),
            number("eco_pct", "ECO (%)"),
            number("esp_pct", "ESP (%)"),
        ],
        groups: vec![],
        locations: vec![fixed_axis("location", "Location", &["Unit-1", "Unit-2", "Coal"])],
        edit_gated: false,
    }
}

/// Boiler / steam chemistry matrix, per dm_config.
fn chemical_matrix() -> FormSchema {
    FormSchema {
        id: "chemical_matrix".into(),
        label: "Boiler / Steam Chemistry (Matrix)".into(),
        fields: vec![
            number("conductivity", "Conductivity (uS/cm)"),
            number("ph", "pH"),
            number("breading", "B Reading (ml)"),
            number("phosphate", "Phosphate (ppm)"),
            number("sio2", "SiO2 (ppm)"),
            number("cl_ppm", "Cl (ppm)"),
            number("nh3", "NH3 (ppm)"),
            number("n2h4", "N2H4 (ppm)"),
            number("fe_ppm", "Fe (ppm)"),
            number("hardness", "Hardness (ppm)"),
            number("turbidity", "Turbidity (NTU)"),
            number("o2", "O2 (ppm)"),
        ],
        groups: vec![],
        locations: vec![
            fixed_axis("main_area", "Main Area", &["Unit #1", "Unit #2"]),
            fixed_axis(
                "location",
                "Location",
                &[
                    "Condensate Water",
                    "Feed Water",
                    "Drum Water",
                    "Saturated Steam",
                    "Super Heated Steam",
                    "Hot Reheated Steam",
                ],
            ),
        ],
        edit_gated: false,
    }
}

/// CW / CT / make-up / raw water parameters.
fn chemical_param() -> FormSchema {
    FormSchema {
        id: "chemical_param".into(),
        label: "CW / CT / MU / Raw Water".into(),
        fields: vec![
            number("temp_c", "Temp (C)"),
            number("turbidity", "Turbidity (NTU)"),
            number("ph", "pH"),
            number("p_alkalinity", "P-Alk (ppm)"),
            number("m_alkalinity", "M-Alk (ppm)"),
            number("ca_h", "Ca-H (ppm)"),
            number("mg_h", "Mg-H (ppm)"),
            number("th", "T.H. (ppm)"),
            number("cl_ppm", "Cl (ppm)"),
            number("conductivity", "Cond (uS/cm)"),
            number("tds", "TDS (ppm)"),
            number("sio2", "SiO2 (ppm)"),
        ],
        groups: vec![],
        locations: vec![
            fixed_axis("main_area", "Main Area", &["Unit #1", "Unit #2", "14 MW"]),
            fixed_axis(
                "exact_area",
                "Exact Collection Area",
                &[
                    "CT Make Up",
                    "Circulating Water",
                    "Clarified Water",
                    "Intake Water",
                ],
            ),
        ],
        edit_gated: false,
    }
}

/// DM water production / consumption ledger.
fn dm_water() -> FormSchema {
    FormSchema {
        id: "dm_water".into(),
        label: "DM Water Data".into(),
        fields: vec![
            number("tank1_level_m", "Tank1 Level (m)"),
            number("tank2_level_m", "Tank2 Level (m)"),
            number("dm_produced_t", "Produced (T)"),
            number("dm_used_t", "Used (T)"),
            number("transfer_to_unit1_t", "Transferred to Unit-1 (T)"),
            number("transfer_to_unit2_t", "Transferred to Unit-2 (T)"),
        ],
        groups: vec![],
        locations: vec![fixed_axis("location", "Location", &["DM", "Unit-1", "Unit-2"])],
        edit_gated: false,
    }
}

/// Fuel oil ledger entry. Opening/closing stock are backend-derived; only
/// receipts and consumption are entered here.
fn fuel_oil() -> FormSchema {
    FormSchema {
        id: "fuel_oil".into(),
        label: "Fuel Oil Ledger".into(),
        fields: vec![
            number("receipt_kl", "Receipt (KL)"),
            number("consumption_kl", "Consumption (KL)"),
            field("remarks", "Remarks", FieldType::Textarea),
        ],
        groups: vec![],
        locations: vec![fixed_axis("fuel_type", "Fuel Type", &["LDO", "HFO"])],
        edit_gated: true,
    }
}

/// The full builtin definition set, in selector order.
pub fn all() -> Vec<FormSchema> {
    vec![
        unit_report(),
        station_report(),
        proximate(),
        sieve(),
        combustible(),
        chemical_matrix(),
        chemical_param(),
        dm_water(),
        fuel_oil(),
    ]
}
