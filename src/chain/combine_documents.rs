use async_trait::async_trait;
use serde_json::Value;

use crate::{
    callbacks::CallbackManagerForChainRun,
    schemas::{Document, PromptArgs},
};

use super::{Chain, ChainError};

pub const DEFAULT_COMBINE_INPUT_KEY: &str = "input_documents";
pub const DEFAULT_COMBINE_OUTPUT_KEY: &str = "output_text";

/// A chain that reduces a list of documents, plus any extra inputs, to one text output.
#[async_trait]
pub trait CombineDocumentsChain: Chain {
    /// Input key holding the documents.
    fn input_key(&self) -> &str;

    fn output_key(&self) -> &str;

    /// Combine `docs` into a single output. `inputs` holds every other input of the call.
    ///
    /// Returns the output text and any extra outputs to return next to it.
    async fn combine_docs(
        &self,
        docs: &[Document],
        inputs: &PromptArgs,
        run_manager: &CallbackManagerForChainRun,
    ) -> Result<(String, PromptArgs), ChainError>;

    /// Number of tokens the combined prompt would take, when the chain can tell.
    fn prompt_length(
        &self,
        _docs: &[Document],
        _inputs: &PromptArgs,
    ) -> Result<Option<usize>, ChainError> {
        Ok(None)
    }
}

/// Shared `call_impl` body: split the documents off the inputs, combine them and
/// put the result under the chain's output key.
pub async fn call_combine_documents<C>(
    chain: &C,
    inputs: &PromptArgs,
    run_manager: &CallbackManagerForChainRun,
) -> Result<PromptArgs, ChainError>
where
    C: CombineDocumentsChain + ?Sized,
{
    let docs = documents_from_inputs(inputs, chain.input_key())?;
    let other_inputs = inputs
        .iter()
        .filter(|(key, _)| key.as_str() != chain.input_key())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect::<PromptArgs>();

    let (output, mut extra_outputs) = chain.combine_docs(&docs, &other_inputs, run_manager).await?;
    extra_outputs.insert(chain.output_key().to_string(), Value::String(output));

    Ok(extra_outputs)
}

/// Read the documents stored under `key`.
pub fn documents_from_inputs(inputs: &PromptArgs, key: &str) -> Result<Vec<Document>, ChainError> {
    let value = inputs
        .get(key)
        .ok_or_else(|| ChainError::MissingInputKeys(vec![key.to_string()]))?;

    serde_json::from_value(value.clone()).map_err(|e| ChainError::InvalidInput {
        key: key.to_string(),
        reason: format!("expected a list of documents: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::prompt_args;

    use super::*;

    #[test]
    fn test_documents_from_inputs() {
        let inputs = PromptArgs::from([(
            DEFAULT_COMBINE_INPUT_KEY.to_string(),
            json!([
                { "page_content": "A" },
                { "page_content": "B", "metadata": { "source": "b.md" } },
            ]),
        )]);

        let docs = documents_from_inputs(&inputs, DEFAULT_COMBINE_INPUT_KEY).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].metadata["source"], json!("b.md"));

        let err = documents_from_inputs(&prompt_args! { "input_documents" => "nope" }, DEFAULT_COMBINE_INPUT_KEY)
            .unwrap_err();
        assert!(matches!(err, ChainError::InvalidInput { .. }));
    }
}
