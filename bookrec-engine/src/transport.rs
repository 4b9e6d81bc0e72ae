use std::io::{self, Write};
use std::sync::Mutex;

use serde::Serialize;

#[derive(Serialize)]
struct JsonRpcResponse<'a> {
	jsonrpc: &'a str,
	id: u64,
	#[serde(skip_serializing_if = "Option::is_none")]
	result: Option<serde_json::Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<JsonRpcErrorBody>,
}

#[derive(Serialize)]
struct JsonRpcErrorBody {
	code: i32,
	message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	data: Option<serde_json::Value>,
}

/// Writes one JSON-RPC response per line. Stdout by default; any writer
/// can be plugged in for tests.
pub struct NdjsonTransport {
	out: Mutex<Box<dyn Write + Send>>,
}

impl Default for NdjsonTransport {
	fn default() -> Self {
		Self::new()
	}
}

impl NdjsonTransport {
	pub fn new() -> Self {
		Self::with_writer(io::stdout())
	}

	pub fn with_writer(writer: impl Write + Send + 'static) -> Self {
		Self {
			out: Mutex::new(Box::new(writer)),
		}
	}

	pub fn write_response(&self, id: u64, result: serde_json::Value) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: Some(result),
			error: None,
		});
	}

	pub fn write_error(
		&self,
		id: u64,
		code: i32,
		message: impl Into<String>,
		data: Option<serde_json::Value>,
	) {
		self.write_line(&JsonRpcResponse {
			jsonrpc: "2.0",
			id,
			result: None,
			error: Some(JsonRpcErrorBody {
				code,
				message: message.into(),
				data,
			}),
		});
	}

	fn write_line(&self, value: &impl Serialize) {
		let line = match serde_json::to_vec(value) {
			Ok(mut line) => {
				line.push(b'\n');
				line
			}
			Err(e) => {
				tracing::error!("Failed to serialize: {}", e);
				return;
			}
		};
		let mut out = match self.out.lock() {
			Ok(out) => out,
			Err(poisoned) => poisoned.into_inner(),
		};
		if let Err(e) = out.write_all(&line) {
			tracing::error!("Failed to write response: {}", e);
			return;
		}
		let _ = out.flush();
	}
}

/// Cloneable in-memory sink for inspecting what the transport wrote.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl Write for SharedBuffer {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.0.lock().unwrap().write(buf)
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

#[cfg(test)]
impl SharedBuffer {
	pub(crate) fn lines(&self) -> Vec<serde_json::Value> {
		let bytes = self.0.lock().unwrap().clone();
		String::from_utf8(bytes)
			.unwrap()
			.lines()
			.map(|l| serde_json::from_str(l).unwrap())
			.collect()
	}
}
