//! Tests for batch compilation
//!
//! Comprehensive test suite verifying batch grouping, envelope framing,
//! content-ID numbering, and changeset token rotation

#[cfg(test)]
mod tests {
    use crate::Operation;
    use crate::batch::BatchCompiler;
    use crate::params::BatchParameters;
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde_json::{Value, json};

    /// Helper function to build batch parameters for tests
    fn create_params(batch_size: usize, query_param_names: Option<Vec<&str>>) -> BatchParameters {
        BatchParameters {
            base_url: "https://contoso.example".to_string(),
            collection: "accounts".to_string(),
            batch_size,
            query_param_names: query_param_names
                .map(|names| names.into_iter().map(str::to_string).collect()),
        }
    }

    /// Helper function to build an operation from a JSON literal
    fn create_operation(value: Value) -> Operation {
        match value {
            Value::Object(fields) => Operation::new(fields),
            _ => panic!("Test operations must be JSON objects"),
        }
    }

    /// Helper function to decode a sealed envelope back to its text form
    fn decode_envelope(payload: &str) -> String {
        let bytes = STANDARD.decode(payload).expect("envelope must be valid base64");
        String::from_utf8(bytes).expect("envelope must be valid UTF-8")
    }

    /// Helper function to collect the content IDs declared in an envelope
    fn content_ids(envelope: &str) -> Vec<u32> {
        envelope
            .lines()
            .filter_map(|line| line.strip_prefix("Content-ID: "))
            .map(|id| id.parse().expect("content ID must be numeric"))
            .collect()
    }

    /// Helper function to read the changeset token an envelope declares
    fn changeset_token(envelope: &str) -> String {
        envelope
            .lines()
            .find_map(|line| line.strip_prefix("Content-Type: multipart/mixed;boundary=changeset_"))
            .expect("envelope must declare its changeset boundary")
            .to_string()
    }

    #[test]
    fn test_empty_input_produces_no_envelopes() {
        let compiler = BatchCompiler::new(create_params(100, None));
        let payloads = compiler.compile(&[]).unwrap();
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_single_operation_produces_one_envelope() {
        let compiler = BatchCompiler::new(create_params(100, None));
        let operations = vec![create_operation(json!({"name": "A"}))];

        let payloads = compiler.compile(&operations).unwrap();

        assert_eq!(payloads.len(), 1);
        let envelope = decode_envelope(&payloads[0]);
        assert_eq!(content_ids(&envelope), vec![1]);
    }

    #[test]
    fn test_batch_size_equal_to_input_produces_one_envelope() {
        let compiler = BatchCompiler::new(create_params(3, None));
        let operations: Vec<Operation> = (0..3)
            .map(|i| create_operation(json!({"index": i})))
            .collect();

        let payloads = compiler.compile(&operations).unwrap();

        assert_eq!(payloads.len(), 1);
        let envelope = decode_envelope(&payloads[0]);
        assert_eq!(content_ids(&envelope), vec![1, 2, 3]);
    }

    #[test]
    fn test_envelope_count_matches_batch_ceiling() {
        // 7 operations at 3 per batch should produce ceil(7 / 3) = 3 envelopes
        let compiler = BatchCompiler::new(create_params(3, None));
        let operations: Vec<Operation> = (0..7)
            .map(|i| create_operation(json!({"index": i})))
            .collect();

        let payloads = compiler.compile(&operations).unwrap();

        assert_eq!(payloads.len(), 3);
    }

    #[test]
    fn test_content_ids_restart_in_each_batch() {
        // 3 operations at 2 per batch: first envelope numbers 1..2, second restarts at 1
        let compiler = BatchCompiler::new(create_params(2, None));
        let operations: Vec<Operation> = (0..3)
            .map(|i| create_operation(json!({"index": i})))
            .collect();

        let payloads = compiler.compile(&operations).unwrap();

        assert_eq!(payloads.len(), 2);
        assert_eq!(content_ids(&decode_envelope(&payloads[0])), vec![1, 2]);
        assert_eq!(content_ids(&decode_envelope(&payloads[1])), vec![1]);
    }

    #[test]
    fn test_changeset_tokens_distinct_across_batches() {
        let compiler = BatchCompiler::new(create_params(1, None));
        let operations: Vec<Operation> = (0..4)
            .map(|i| create_operation(json!({"index": i})))
            .collect();

        let payloads = compiler.compile(&operations).unwrap();
        assert_eq!(payloads.len(), 4);

        let mut tokens: Vec<String> = payloads
            .iter()
            .map(|payload| changeset_token(&decode_envelope(payload)))
            .collect();
        tokens.sort();
        tokens.dedup();

        // Pairwise distinct: deduplication must not remove anything
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_changeset_token_consistent_within_batch() {
        let compiler = BatchCompiler::new(create_params(100, None));
        let operations: Vec<Operation> = (0..3)
            .map(|i| create_operation(json!({"index": i})))
            .collect();

        let payloads = compiler.compile(&operations).unwrap();
        let envelope = decode_envelope(&payloads[0]);
        let token = changeset_token(&envelope);

        // Every changeset boundary line references the declared token
        let boundary_lines: Vec<&str> = envelope
            .lines()
            .filter(|line| line.starts_with("--changeset_"))
            .collect();
        assert_eq!(boundary_lines.len(), 4); // 3 operations + 1 closing boundary
        for line in &boundary_lines {
            assert!(line.contains(&token), "boundary {:?} must carry the batch token", line);
        }
        assert_eq!(*boundary_lines.last().unwrap(), format!("--changeset_{}--", token));
    }

    #[test]
    fn test_envelope_framing_and_addressing() {
        let compiler = BatchCompiler::new(create_params(100, None));
        let operations = vec![create_operation(json!({"name": "A"}))];

        let payloads = compiler.compile(&operations).unwrap();
        let envelope = decode_envelope(&payloads[0]);

        assert!(envelope.starts_with("--batch_accounts\r\n"));
        assert!(envelope.ends_with("--batch_accounts--"));
        assert!(envelope.contains("Content-Type:application/http"));
        assert!(envelope.contains("Content-Transfer-Encoding:binary"));
        assert!(
            envelope.contains("PATCH https://contoso.example/api/data/v9.1/accounts HTTP/1.1")
        );
    }

    #[test]
    fn test_operation_body_embedded_in_envelope() {
        let compiler = BatchCompiler::new(create_params(100, None));
        let operations = vec![create_operation(json!({"name": "A", "revenue": 5000}))];

        let payloads = compiler.compile(&operations).unwrap();
        let envelope = decode_envelope(&payloads[0]);

        let expected_body = operations[0].to_json().unwrap();
        assert!(envelope.contains(&expected_body));
    }

    #[test]
    fn test_query_clause_rendered_for_present_fields() {
        let compiler = BatchCompiler::new(create_params(100, Some(vec!["name"])));
        let operations = vec![create_operation(json!({"name": "A"}))];

        let payloads = compiler.compile(&operations).unwrap();
        let envelope = decode_envelope(&payloads[0]);

        assert!(envelope.contains("/api/data/v9.1/accounts(name='A') HTTP/1.1"));
    }

    #[test]
    fn test_query_clause_joins_multiple_fields() {
        let compiler =
            BatchCompiler::new(create_params(100, Some(vec!["name", "accountnumber"])));
        let operations = vec![create_operation(json!({"name": "A", "accountnumber": 42}))];

        let payloads = compiler.compile(&operations).unwrap();
        let envelope = decode_envelope(&payloads[0]);

        assert!(envelope.contains("accounts(name='A',accountnumber='42') HTTP/1.1"));
    }

    #[test]
    fn test_query_clause_skips_absent_fields() {
        let compiler =
            BatchCompiler::new(create_params(100, Some(vec!["name", "accountnumber"])));
        let operations = vec![create_operation(json!({"accountnumber": "007"}))];

        let payloads = compiler.compile(&operations).unwrap();
        let envelope = decode_envelope(&payloads[0]);

        assert!(envelope.contains("accounts(accountnumber='007') HTTP/1.1"));
    }

    #[test]
    fn test_query_clause_omitted_when_no_fields_present() {
        // A configured parameter list with no matching fields renders no parentheses
        let compiler = BatchCompiler::new(create_params(100, Some(vec!["name"])));
        let operations = vec![create_operation(json!({"other": "x"}))];

        let payloads = compiler.compile(&operations).unwrap();
        let envelope = decode_envelope(&payloads[0]);

        assert!(envelope.contains("/api/data/v9.1/accounts HTTP/1.1"));
        assert!(!envelope.contains('('));
    }

    #[test]
    fn test_each_compilation_mints_fresh_tokens() {
        let compiler = BatchCompiler::new(create_params(100, None));
        let operations = vec![create_operation(json!({"name": "A"}))];

        let first = compiler.compile(&operations).unwrap();
        let second = compiler.compile(&operations).unwrap();

        let first_token = changeset_token(&decode_envelope(&first[0]));
        let second_token = changeset_token(&decode_envelope(&second[0]));
        assert_ne!(first_token, second_token);
    }
}
