//! Counting the rows of a CSV table per group

use std::{
    collections::BTreeMap,
    io::{Read, Write},
};

use stacked_errors::{Result, StackableErr};

pub const DEFAULT_KEY_COLUMN: &str = "covid19_country";
pub const DEFAULT_VALUE_COLUMN: &str = "secret_name";

/// Fields that count as missing, the same set that pandas `read_csv` treats
/// as NA by default
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns if `field` is one of the `MISSING_TOKENS`. Fields are compared
/// exactly, " NA" is a value.
pub fn is_missing(field: &str) -> bool {
    MISSING_TOKENS.contains(&field)
}

/// For every distinct present value of `key_column`, counts the rows that
/// have a present `value_column` (see [is_missing]). Groups whose rows all
/// lack a value are kept with a count of zero.
pub fn count_by<R: Read>(
    reader: R,
    key_column: &str,
    value_column: &str,
) -> Result<BTreeMap<String, u64>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader
        .headers()
        .stack_err("count_by -> could not read the header row")?
        .clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .stack_err_with(|| format!("count_by -> there is no column named \"{name}\""))
    };
    let key_index = column(key_column)?;
    let value_index = column(value_column)?;
    let mut counts = BTreeMap::new();
    for record in reader.records() {
        let record = record.stack_err("count_by -> malformed row")?;
        let key = record.get(key_index).unwrap_or_default();
        if is_missing(key) {
            continue
        }
        let count = counts.entry(key.to_owned()).or_insert(0);
        if !is_missing(record.get(value_index).unwrap_or_default()) {
            *count += 1;
        }
    }
    Ok(counts)
}

/// Writes a `key_column,value_column` header followed by one row per group
pub fn write_counts<W: Write>(
    writer: W,
    key_column: &str,
    value_column: &str,
    counts: &BTreeMap<String, u64>,
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([key_column, value_column]).stack()?;
    for (key, count) in counts {
        let count = count.to_string();
        writer.write_record([key.as_str(), count.as_str()]).stack()?;
    }
    writer.flush().stack()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
id,covid19_country,secret_name
1,Spain,a
2,France,b
3,Spain,c
4,,d
5,Italy,
6,\"Korea, South\",e
";

    #[test]
    fn counts_per_group() {
        let counts = count_by(TABLE.as_bytes(), DEFAULT_KEY_COLUMN, DEFAULT_VALUE_COLUMN).unwrap();
        assert_eq!(counts.len(), 4);
        assert_eq!(counts["Spain"], 2);
        assert_eq!(counts["France"], 1);
        assert_eq!(counts["Italy"], 0);
        assert_eq!(counts["Korea, South"], 1);

        let mut out = vec![];
        write_counts(&mut out, DEFAULT_KEY_COLUMN, DEFAULT_VALUE_COLUMN, &counts).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "covid19_country,secret_name\nFrance,1\nItaly,0\n\"Korea, South\",1\nSpain,2\n"
        );
    }

    #[test]
    fn na_tokens_are_missing() {
        let table = "\
covid19_country,secret_name
Spain,NA
Spain,x
NaN,y
N/A,z
null,w
Peru,null
Peru,N/A
Chad, NA
";
        let counts = count_by(table.as_bytes(), DEFAULT_KEY_COLUMN, DEFAULT_VALUE_COLUMN).unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["Spain"], 1);
        assert_eq!(counts["Peru"], 0);
        assert_eq!(counts["Chad"], 1);
        assert!(is_missing("<NA>"));
        assert!(!is_missing("na"));
    }

    #[test]
    fn unknown_column() {
        assert!(count_by(TABLE.as_bytes(), "country", DEFAULT_VALUE_COLUMN).is_err());
    }
}
