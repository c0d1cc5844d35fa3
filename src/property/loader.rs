//! Load property records from JSON or CSV

use super::raw::RawProperty;
use super::PropertyInput;
use crate::error::EngineResult;
use csv::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a single property from a JSON file holding one raw form record
pub fn load_property_json<P: AsRef<Path>>(path: P) -> EngineResult<PropertyInput> {
    let file = File::open(path)?;
    load_property_json_from_reader(BufReader::new(file))
}

/// Load a single property from any JSON reader
pub fn load_property_json_from_reader<R: std::io::Read>(reader: R) -> EngineResult<PropertyInput> {
    let raw: RawProperty = serde_json::from_reader(reader)?;
    Ok(raw.normalize())
}

/// Load all properties from a CSV file, one raw record per row
pub fn load_properties<P: AsRef<Path>>(path: P) -> EngineResult<Vec<PropertyInput>> {
    let reader = Reader::from_path(path)?;
    read_rows(reader)
}

/// Load properties from any CSV reader (e.g., string buffer, network stream)
pub fn load_properties_from_reader<R: std::io::Read>(reader: R) -> EngineResult<Vec<PropertyInput>> {
    read_rows(Reader::from_reader(reader))
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> EngineResult<Vec<PropertyInput>> {
    let mut properties = Vec::new();

    for result in reader.deserialize() {
        let row: RawProperty = result?;
        properties.push(row.normalize());
    }

    log::debug!("Loaded {} properties", properties.len());
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::FinancingType;

    #[test]
    fn test_load_properties_from_csv() {
        let data = "\
name,purchasePrice,numberOfUnits,province,annualRent,vacancyRate,financingType,interestRate
Duplex,450000,2,QC,30000,3,conventional,5
Sixplex,\"1 200 000 $\",6,ON,\"96 000\",\"2,5 %\",cmhc,\"4,5\"
";
        let properties = load_properties_from_reader(data.as_bytes()).unwrap();
        assert_eq!(properties.len(), 2);

        assert_eq!(properties[0].name.as_deref(), Some("Duplex"));
        assert_eq!(properties[0].number_of_units, 2);
        assert!((properties[0].revenue.vacancy_rate - 0.03).abs() < 1e-12);

        assert_eq!(properties[1].purchase_price, 1_200_000.0);
        assert_eq!(properties[1].revenue.annual_rent, 96_000.0);
        assert_eq!(properties[1].financing.financing_type, FinancingType::Cmhc);
        assert!((properties[1].financing.interest_rate - 0.045).abs() < 1e-12);
    }

    #[test]
    fn test_empty_csv_fields_default_to_zero() {
        let data = "name,purchasePrice,annualRent\nEmpty,,\n";
        let properties = load_properties_from_reader(data.as_bytes()).unwrap();
        assert_eq!(properties[0].purchase_price, 0.0);
        assert_eq!(properties[0].revenue.annual_rent, 0.0);
    }

    #[test]
    fn test_load_property_json_from_reader() {
        let json = r#"{"purchasePrice": 300000, "annualRent": "24 000"}"#;
        let property = load_property_json_from_reader(json.as_bytes()).unwrap();
        assert_eq!(property.purchase_price, 300_000.0);
        assert_eq!(property.revenue.annual_rent, 24_000.0);
    }
}
