//! `key=value` client option parsing

use contracts::ContractError;

/// Parse `key=value` pairs
///
/// Each pair is trimmed and must contain exactly one `=` with a non-empty key
/// and value (both trimmed). The first malformed pair is reported by name.
pub fn parse_client_opts<I, S>(pairs: I) -> Result<Vec<(String, String)>, ContractError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pairs
        .into_iter()
        .map(|pair| parse_pair(pair.as_ref()))
        .collect()
}

fn parse_pair(pair: &str) -> Result<(String, String), ContractError> {
    let pair = pair.trim();
    let invalid = |message: &str| {
        ContractError::config_validation("client-opt", format!("pair {pair:?} {message}"))
    };

    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| invalid("missing '=' delim"))?;
    if value.contains('=') {
        return Err(invalid("contains too many '='s"));
    }

    let (key, value) = (key.trim(), value.trim());
    if key.is_empty() || value.is_empty() {
        return Err(invalid("contains an empty key or val"));
    }

    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_pairs() {
        let parsed = parse_client_opts([" dir = ./out ", "format=bincode"]).unwrap();
        assert_eq!(
            parsed,
            vec![
                ("dir".to_string(), "./out".to_string()),
                ("format".to_string(), "bincode".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_no_pairs() {
        let parsed = parse_client_opts(Vec::<String>::new()).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_missing_equals() {
        let err = parse_client_opts(["dir"]).unwrap_err().to_string();
        assert!(err.contains("missing '='"), "got: {err}");
        assert!(err.contains("\"dir\""), "got: {err}");
    }

    #[test]
    fn test_too_many_equals() {
        let err = parse_client_opts(["a=b=c"]).unwrap_err().to_string();
        assert!(err.contains("too many"), "got: {err}");
    }

    #[test]
    fn test_empty_key_or_value() {
        for pair in ["=v", "k=", " = "] {
            let err = parse_client_opts([pair]).unwrap_err().to_string();
            assert!(err.contains("empty key or val"), "pair {pair}: {err}");
        }
    }

    #[test]
    fn test_first_bad_pair_wins() {
        let err = parse_client_opts(["ok=1", "bad", "x=y=z"])
            .unwrap_err()
            .to_string();
        assert!(err.contains("\"bad\""), "got: {err}");
    }
}
