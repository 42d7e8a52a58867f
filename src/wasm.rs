use std::sync::Arc;

use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

use crate::bigram::{BigramModel, BigramTable};
use crate::combinatorics::CombinationCounter;
use crate::protocol::{Response, SearchRequest};
use crate::scheduler::{SearchJob, SliceBudget};

fn request_from_js(value: JsValue) -> Result<SearchRequest, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid search request: {e}")))
}

fn model_from_js(value: JsValue) -> Result<Option<Arc<BigramModel>>, JsValue> {
    if value.is_null() || value.is_undefined() {
        return Ok(None);
    }
    let table: BigramTable = from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid bigram table: {e}")))?;
    BigramModel::from_table(table)
        .map(|model| Some(Arc::new(model)))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn response_to_js(response: &Response) -> Result<JsValue, JsValue> {
    to_value(response).map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// One search driven by the JavaScript host, which owns the timers and
/// drops the object to cancel.
#[wasm_bindgen]
pub struct WasmSearch {
    job: SearchJob,
    counter: CombinationCounter,
}

#[wasm_bindgen]
impl WasmSearch {
    #[wasm_bindgen(constructor)]
    pub fn new(request: JsValue, bigrams: JsValue, capacity: usize) -> Result<WasmSearch, JsValue> {
        let request = request_from_js(request)?;
        let model = model_from_js(bigrams)?;
        let job = SearchJob::new(&request, model, capacity)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmSearch {
            job,
            counter: CombinationCounter::new(),
        })
    }

    /// Scan up to `max_candidates` candidates and return an update, or an
    /// error response tagged with the search id.
    pub fn run_slice(&mut self, max_candidates: usize) -> Result<JsValue, JsValue> {
        let response = match self
            .job
            .run_slice(SliceBudget::Candidates(max_candidates), &mut self.counter)
        {
            Ok(update) => Response::Update(update),
            Err(err) => Response::failure(Some(self.job.search_id()), &err),
        };
        response_to_js(&response)
    }

    pub fn is_finished(&self) -> bool {
        self.job.is_finished()
    }
}
