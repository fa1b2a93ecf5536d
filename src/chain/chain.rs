use std::{fs, path::Path, sync::Arc};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{
    callbacks::{CallbackHandler, CallbackManager, CallbackManagerForChainRun},
    memory::SharedMemory,
    schemas::{value_to_text, PromptArgs, RunInfo, RUN_KEY},
};

use super::{ChainCallOptions, ChainError, ChainInput, RunArgs};

/// A unit of work over named inputs that produces named outputs.
///
/// Implementors provide the key declarations and [`Chain::call_impl`]; input
/// preparation, memory, callbacks and result shaping come from the provided
/// methods.
///
/// # Example
///
/// ```rust,ignore
/// let chain = LLMChain::builder()
///     .prompt(PromptTemplate::from_fstring("Tell me a joke about {topic}"))
///     .llm(Arc::new(OpenAI::default()))
///     .build()?;
///
/// let joke = chain.run("rust".into()).await?;
/// let outputs = chain
///     .call(prompt_args! { "topic" => "rust" }.into(), ChainCallOptions::default())
///     .await?;
/// ```
#[async_trait]
pub trait Chain: Sync + Send {
    fn input_keys(&self) -> Vec<String>;

    fn output_keys(&self) -> Vec<String>;

    fn memory(&self) -> Option<&SharedMemory> {
        None
    }

    fn callbacks(&self) -> &[Arc<dyn CallbackHandler>] {
        &[]
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    fn verbose(&self) -> bool {
        false
    }

    /// Discriminator written as `_type` when the chain is saved. Chains without one can't be saved.
    fn chain_type(&self) -> Option<&str> {
        None
    }

    /// Configuration snapshot used for callbacks and persistence. Never includes memory.
    fn to_config(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Run the chain's own logic on fully prepared inputs.
    async fn call_impl(
        &self,
        inputs: &PromptArgs,
        run_manager: &CallbackManagerForChainRun,
    ) -> Result<PromptArgs, ChainError>;

    /// Resolve a single value to its input key, merge memory variables and validate.
    async fn prep_inputs(&self, input: ChainInput) -> Result<PromptArgs, ChainError> {
        let memory = match self.memory() {
            Some(memory) => Some(memory.read().await),
            None => None,
        };

        let mut inputs = match input {
            ChainInput::Map(inputs) => inputs,
            ChainInput::Single(value) => {
                let memory_variables = memory
                    .as_ref()
                    .map(|memory| memory.memory_variables())
                    .unwrap_or_default();
                let mut unmet = self
                    .input_keys()
                    .into_iter()
                    .filter(|key| !memory_variables.contains(key))
                    .collect::<Vec<_>>();

                if unmet.len() != 1 {
                    return Err(ChainError::AmbiguousInput(unmet));
                }

                PromptArgs::from([(unmet.remove(0), value)])
            }
        };

        if let Some(memory) = memory {
            for (key, value) in memory.load_memory_variables(&inputs) {
                if inputs.contains_key(&key) {
                    log::warn!("Memory variable `{key}` overrides the value passed by the caller");
                }
                inputs.insert(key, value);
            }
        }

        self.validate_inputs(&inputs)?;
        Ok(inputs)
    }

    fn validate_inputs(&self, inputs: &PromptArgs) -> Result<(), ChainError> {
        let missing_keys = self
            .input_keys()
            .into_iter()
            .filter(|key| !inputs.contains_key(key))
            .collect::<Vec<_>>();

        if !missing_keys.is_empty() {
            return Err(ChainError::MissingInputKeys(missing_keys));
        }

        Ok(())
    }

    fn validate_outputs(&self, outputs: &PromptArgs) -> Result<(), ChainError> {
        let missing_keys = self
            .output_keys()
            .into_iter()
            .filter(|key| !outputs.contains_key(key))
            .collect::<Vec<_>>();

        if !missing_keys.is_empty() {
            return Err(ChainError::MissingOutputKeys(missing_keys));
        }

        Ok(())
    }

    /// Validate outputs, save the exchange to memory and shape the return value.
    async fn prep_outputs(
        &self,
        inputs: PromptArgs,
        outputs: PromptArgs,
        return_only_outputs: bool,
    ) -> Result<PromptArgs, ChainError> {
        self.validate_outputs(&outputs)?;

        if let Some(memory) = self.memory() {
            memory.write().await.save_context(&inputs, &outputs);
        }

        if return_only_outputs {
            return Ok(outputs);
        }

        let mut merged = inputs;
        merged.extend(outputs);
        Ok(merged)
    }

    async fn call(
        &self,
        input: ChainInput,
        options: ChainCallOptions,
    ) -> Result<PromptArgs, ChainError> {
        let inputs = self.prep_inputs(input).await?;

        let tags = [self.tags(), options.tags.as_slice()].concat();
        let callback_manager = CallbackManager::configure(
            options.callbacks.as_ref(),
            self.callbacks(),
            self.verbose(),
            &tags,
        );
        let run_manager = callback_manager.on_chain_start(&self.serialized(), &inputs);

        let outputs = match self.call_impl(&inputs, &run_manager).await {
            Ok(outputs) => outputs,
            Err(e) => {
                run_manager.on_chain_error(&e);
                return Err(e);
            }
        };
        run_manager.on_chain_end(&outputs);

        let mut final_outputs = self
            .prep_outputs(inputs, outputs, options.return_only_outputs)
            .await?;

        if options.include_run_info {
            final_outputs.insert(
                RUN_KEY.into(),
                serde_json::to_value(RunInfo::new(run_manager.run_id()))?,
            );
        }

        Ok(final_outputs)
    }

    async fn invoke(&self, input: ChainInput) -> Result<PromptArgs, ChainError> {
        self.call(input, ChainCallOptions::default()).await
    }

    /// Call the chain on every input in order. The first failure aborts the batch.
    async fn apply(
        &self,
        input_list: Vec<PromptArgs>,
        options: ChainCallOptions,
    ) -> Result<Vec<PromptArgs>, ChainError> {
        let mut outputs = Vec::with_capacity(input_list.len());
        for inputs in input_list {
            outputs.push(self.call(ChainInput::Map(inputs), options.clone()).await?);
        }
        Ok(outputs)
    }

    /// Text in (or keyword values in), text out. Only for chains with one output key.
    async fn run(&self, args: RunArgs) -> Result<String, ChainError> {
        let output_keys = self.output_keys();
        if output_keys.len() != 1 {
            return Err(ChainError::MultipleOutputKeys(output_keys));
        }

        let input = args.into_chain_input()?;
        let outputs = self.call(input, ChainCallOptions::default()).await?;

        let value = outputs
            .get(&output_keys[0])
            .ok_or_else(|| ChainError::MissingOutputKeys(output_keys.clone()))?;
        Ok(value_to_text(value).into_owned())
    }

    /// What callback handlers receive as the chain's description.
    fn serialized(&self) -> Value {
        let mut config = self.to_config();
        config.insert(
            "_type".into(),
            Value::String(self.chain_type().unwrap_or("not_implemented").into()),
        );
        Value::Object(config)
    }

    fn to_dict(&self) -> Result<Value, ChainError> {
        if self.memory().is_some() {
            return Err(ChainError::UnsavedMemory);
        }
        let chain_type = self.chain_type().ok_or(ChainError::SaveNotSupported)?;

        let mut config = self.to_config();
        config.insert("_type".into(), json!(chain_type));
        Ok(Value::Object(config))
    }

    /// Save the chain's configuration to a `.json`, `.yaml` or `.yml` file.
    fn save(&self, path: &Path) -> Result<(), ChainError> {
        let chain_dict = self.to_dict()?;
        write_config(path, &chain_dict)
    }
}

fn write_config(path: &Path, config: &Value) -> Result<(), ChainError> {
    let extension = path.extension().and_then(|ext| ext.to_str());
    let contents = match extension {
        Some("json") => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            config.serialize(&mut serializer)?;
            String::from_utf8_lossy(&buf).into_owned()
        }
        Some("yaml") | Some("yml") => serde_yaml::to_string(config)?,
        _ => return Err(ChainError::UnsupportedFormat(path.to_path_buf())),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    log::debug!("Saved chain to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use tokio::sync::RwLock;
    use uuid::Uuid;

    use crate::{
        memory::{Memory, SimpleMemory},
        prompt_args,
    };

    use super::*;

    /// Joins its inputs into `out`, optionally failing or dropping outputs.
    struct JoinChain {
        input_keys: Vec<String>,
        output_keys: Vec<String>,
        memory: Option<SharedMemory>,
        callbacks: Vec<Arc<dyn CallbackHandler>>,
        fail: bool,
    }

    impl JoinChain {
        fn new(input_keys: &[&str]) -> Self {
            Self {
                input_keys: input_keys.iter().map(|k| k.to_string()).collect(),
                output_keys: vec!["out".into()],
                memory: None,
                callbacks: Vec::new(),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl Chain for JoinChain {
        fn input_keys(&self) -> Vec<String> {
            self.input_keys.clone()
        }

        fn output_keys(&self) -> Vec<String> {
            self.output_keys.clone()
        }

        fn memory(&self) -> Option<&SharedMemory> {
            self.memory.as_ref()
        }

        fn callbacks(&self) -> &[Arc<dyn CallbackHandler>] {
            &self.callbacks
        }

        fn chain_type(&self) -> Option<&str> {
            Some("join_chain")
        }

        fn to_config(&self) -> Map<String, Value> {
            let mut config = Map::new();
            config.insert("input_keys".into(), json!(self.input_keys));
            config
        }

        async fn call_impl(
            &self,
            inputs: &PromptArgs,
            _run_manager: &CallbackManagerForChainRun,
        ) -> Result<PromptArgs, ChainError> {
            if self.fail {
                return Err(ChainError::InvalidCall("boom".into()));
            }
            let joined = self
                .input_keys
                .iter()
                .map(|key| value_to_text(&inputs[key]).into_owned())
                .collect::<Vec<_>>()
                .join("+");
            Ok(prompt_args! { "out" => joined })
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl CallbackHandler for Recorder {
        fn on_chain_start(
            &self,
            _run_id: Uuid,
            _parent_run_id: Option<Uuid>,
            serialized: &Value,
            _inputs: &PromptArgs,
            _tags: &[String],
        ) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {}", serialized["_type"]));
        }

        fn on_chain_end(&self, _run_id: Uuid, _outputs: &PromptArgs) {
            self.events.lock().unwrap().push("end".into());
        }

        fn on_chain_error(&self, _run_id: Uuid, error: &ChainError) {
            self.events.lock().unwrap().push(format!("error {error}"));
        }
    }

    /// Records what it was asked to save.
    #[derive(Default)]
    struct RecordingMemory {
        saved: Vec<(PromptArgs, PromptArgs)>,
    }

    impl Memory for RecordingMemory {
        fn memory_variables(&self) -> Vec<String> {
            Vec::new()
        }

        fn load_memory_variables(&self, _inputs: &PromptArgs) -> PromptArgs {
            PromptArgs::new()
        }

        fn save_context(&mut self, inputs: &PromptArgs, outputs: &PromptArgs) {
            self.saved.push((inputs.clone(), outputs.clone()));
        }

        fn clear(&mut self) {
            self.saved.clear();
        }
    }

    #[tokio::test]
    async fn test_single_value_equals_single_key_mapping() {
        let chain = JoinChain::new(&["a"]);

        let from_scalar = chain.invoke("x".into()).await.unwrap();
        let from_map = chain.invoke(prompt_args! { "a" => "x" }.into()).await.unwrap();

        assert_eq!(from_scalar, from_map);
        assert_eq!(from_scalar["out"], "x");
    }

    #[tokio::test]
    async fn test_single_value_with_two_keys_is_ambiguous() {
        let chain = JoinChain::new(&["a", "b"]);

        let err = chain.invoke("x".into()).await.unwrap_err();
        assert!(matches!(err, ChainError::AmbiguousInput(keys) if keys == vec!["a", "b"]));
    }

    #[tokio::test]
    async fn test_memory_resolves_the_single_unmet_key() {
        let mut chain = JoinChain::new(&["a", "b"]);
        chain.memory = Some(SimpleMemory::new(prompt_args! { "b" => "mem" }).into());

        let outputs = chain.invoke("x".into()).await.unwrap();
        assert_eq!(outputs["out"], "x+mem");
    }

    #[tokio::test]
    async fn test_memory_wins_on_collision() {
        let mut chain = JoinChain::new(&["a"]);
        chain.memory = Some(SimpleMemory::new(prompt_args! { "a" => "mem" }).into());

        let outputs = chain
            .invoke(prompt_args! { "a" => "caller" }.into())
            .await
            .unwrap();
        assert_eq!(outputs["out"], "mem");
    }

    #[tokio::test]
    async fn test_missing_inputs_are_reported_every_time() {
        let chain = JoinChain::new(&["a", "b"]);

        for _ in 0..2 {
            let err = chain
                .invoke(prompt_args! { "a" => "x" }.into())
                .await
                .unwrap_err();
            assert!(matches!(err, ChainError::MissingInputKeys(keys) if keys == vec!["b"]));
        }
    }

    #[tokio::test]
    async fn test_missing_outputs_are_reported() {
        let mut chain = JoinChain::new(&["a"]);
        chain.output_keys = vec!["out".into(), "extra".into()];

        let err = chain.invoke("x".into()).await.unwrap_err();
        assert!(matches!(err, ChainError::MissingOutputKeys(keys) if keys == vec!["extra"]));
    }

    #[tokio::test]
    async fn test_return_shape_and_run_info() {
        let chain = JoinChain::new(&["a"]);

        let merged = chain.invoke("x".into()).await.unwrap();
        assert_eq!(merged, prompt_args! { "a" => "x", "out" => "x" });

        let only = chain
            .call(
                "x".into(),
                ChainCallOptions::new()
                    .with_return_only_outputs(true)
                    .with_include_run_info(true),
            )
            .await
            .unwrap();
        assert_eq!(only.len(), 2);
        let run_info: RunInfo = serde_json::from_value(only[RUN_KEY].clone()).unwrap();
        assert!(!run_info.run_id.is_nil());
    }

    #[tokio::test]
    async fn test_outputs_are_saved_to_memory() {
        let memory = Arc::new(RwLock::new(RecordingMemory::default()));
        let shared: SharedMemory = memory.clone();
        let mut chain = JoinChain::new(&["a"]);
        chain.memory = Some(shared);

        chain.invoke("x".into()).await.unwrap();

        let memory = memory.read().await;
        assert_eq!(
            memory.saved,
            vec![(prompt_args! { "a" => "x" }, prompt_args! { "out" => "x" })]
        );
    }

    #[tokio::test]
    async fn test_callbacks_see_start_and_end_or_error() {
        let recorder = Arc::new(Recorder::default());
        let mut chain = JoinChain::new(&["a"]);
        chain.callbacks = vec![recorder.clone() as Arc<dyn CallbackHandler>];

        chain.invoke("x".into()).await.unwrap();
        chain.fail = true;
        let err = chain.invoke("x".into()).await.unwrap_err();
        assert!(matches!(err, ChainError::InvalidCall(_)));

        assert_eq!(
            *recorder.events.lock().unwrap(),
            vec![
                r#"start "join_chain""#,
                "end",
                r#"start "join_chain""#,
                "error Invalid call: boom",
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_preserves_order_and_stops_on_error() {
        let chain = JoinChain::new(&["a"]);

        let outputs = chain
            .apply(
                vec![prompt_args! { "a" => "1" }, prompt_args! { "a" => "2" }],
                ChainCallOptions::default(),
            )
            .await
            .unwrap();
        let texts = outputs.iter().map(|o| o["out"].clone()).collect::<Vec<_>>();
        assert_eq!(texts, vec![json!("1"), json!("2")]);

        let err = chain
            .apply(
                vec![prompt_args! { "a" => "1" }, prompt_args! { "b" => "2" }],
                ChainCallOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::MissingInputKeys(_)));
    }

    #[tokio::test]
    async fn test_run() {
        let chain = JoinChain::new(&["a", "b"]);
        let text = chain
            .run(RunArgs::new().kwarg("a", 1).kwarg("b", "two"))
            .await
            .unwrap();
        assert_eq!(text, "1+two");

        let mut chain = JoinChain::new(&["a"]);
        chain.output_keys = vec!["out".into(), "other".into()];
        let err = chain.run("x".into()).await.unwrap_err();
        assert!(matches!(err, ChainError::MultipleOutputKeys(_)));
    }

    #[test]
    fn test_save_formats() {
        let dir = tempfile::tempdir().unwrap();
        let chain = JoinChain::new(&["a"]);

        let json_path = dir.path().join("nested/chain.json");
        chain.save(&json_path).unwrap();
        let contents = fs::read_to_string(&json_path).unwrap();
        assert!(contents.contains("\n    \"_type\": \"join_chain\""));
        let saved: Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(saved, json!({ "_type": "join_chain", "input_keys": ["a"] }));

        let yaml_path = dir.path().join("chain.yaml");
        chain.save(&yaml_path).unwrap();
        let saved: Value = serde_yaml::from_str(&fs::read_to_string(&yaml_path).unwrap()).unwrap();
        assert_eq!(saved["_type"], "join_chain");

        let err = chain.save(&dir.path().join("chain.txt")).unwrap_err();
        assert!(matches!(err, ChainError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_save_with_memory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = JoinChain::new(&["a"]);
        chain.memory = Some(SimpleMemory::default().into());

        let err = chain.save(&dir.path().join("chain.json")).unwrap_err();
        assert!(matches!(err, ChainError::UnsavedMemory));
    }
}
