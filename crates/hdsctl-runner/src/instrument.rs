//! Field- and command-level access to an instrument.

use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;
use hdsctl_link::Executor;
use hdsctl_scpi::{is_query_command, split_script, Catalog, Field, Request, ScpiError};
use tracing::debug;

use crate::error::{RunnerError, RunnerResult};

/// Length of the framing prefix in front of screen waveform data.
pub const WAVE_FRAME_PREFIX_LEN: usize = 4;

/// A catalog paired with an executor.
///
/// Cloning is cheap; clones share the executor and therefore its cache.
#[derive(Clone)]
pub struct Instrument {
    catalog: Arc<Catalog>,
    executor: Arc<dyn Executor>,
}

impl Instrument {
    /// Create an instrument facade.
    pub fn new(catalog: Catalog, executor: impl Executor + 'static) -> Self {
        Instrument {
            catalog: Arc::new(catalog),
            executor: Arc::new(executor),
        }
    }

    /// The command catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Execute a parsed request.
    ///
    /// Sets on read-only parameters are rejected before reaching the link.
    pub fn execute(&self, request: &Request) -> RunnerResult<Option<Bytes>> {
        if !request.is_query() && !request.definition.is_writable() {
            return Err(ScpiError::ReadOnly(request.path().to_string()).into());
        }
        Ok(self.executor.execute(request)?)
    }

    /// Parse and execute a set command such as `:CH1:DISP ON`.
    pub fn set(&self, command: &str) -> RunnerResult<()> {
        let request = self.catalog.parse(command)?;
        if request.is_query() {
            return Err(ScpiError::UnexpectedArguments(command.trim().to_string()).into());
        }
        self.execute(&request)?;
        Ok(())
    }

    /// Parse and execute a query, returning the raw response.
    pub fn get_bytes(&self, query: &str) -> RunnerResult<Bytes> {
        let request = self.catalog.parse(query)?;
        if !request.is_query() {
            return Err(ScpiError::UnexpectedArguments(query.trim().to_string()).into());
        }
        Ok(self.execute(&request)?.unwrap_or_default())
    }

    /// Parse and execute a query, returning the response as trimmed text.
    pub fn get_string(&self, query: &str) -> RunnerResult<String> {
        let bytes = self.get_bytes(query)?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }

    /// Run a multi-line, `;`-separated script.
    ///
    /// Query results are written to `out`, one per line. The first failure
    /// aborts the script and is returned with the offending command attached.
    pub fn execute_script(&self, script: &str, out: &mut impl Write) -> RunnerResult<()> {
        for command in split_script(script) {
            debug!(command = %command, "Executing");
            if is_query_command(command) {
                let value = self
                    .get_string(command)
                    .map_err(|e| e.in_command(command))?;
                writeln!(out, "{}", value)?;
            } else {
                self.set(command).map_err(|e| e.in_command(command))?;
            }
        }
        Ok(())
    }

    fn query_field(&self, field: Field) -> RunnerResult<Bytes> {
        let definition = self
            .catalog
            .field(field)
            .ok_or_else(|| ScpiError::UnknownField(field.id().to_string()))?;
        Ok(self
            .execute(&Request::query(definition.clone()))?
            .unwrap_or_default())
    }

    /// Read a field as trimmed text.
    pub fn get_field(&self, field: Field) -> RunnerResult<String> {
        let bytes = self.query_field(field)?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }

    /// Write a field.
    pub fn set_field(&self, field: Field, value: &str) -> RunnerResult<()> {
        self.set_field_by_id(field.id(), value)
    }

    /// Read any catalog parameter by its camel-case id.
    pub fn get_field_by_id(&self, id: &str) -> RunnerResult<String> {
        let definition = self
            .catalog
            .lookup_by_id(id)
            .ok_or_else(|| ScpiError::UnknownField(id.to_string()))?;
        let bytes = self
            .execute(&Request::query(definition.clone()))?
            .unwrap_or_default();
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }

    /// Write any catalog parameter by its camel-case id.
    pub fn set_field_by_id(&self, id: &str, value: &str) -> RunnerResult<()> {
        let definition = self
            .catalog
            .lookup_by_id(id)
            .ok_or_else(|| ScpiError::UnknownField(id.to_string()))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ScpiError::UnexpectedArguments(definition.path.clone()).into());
        }
        self.execute(&Request::set(definition.clone(), value))?;
        Ok(())
    }

    /// Fetch the screen waveform of a channel as signed samples.
    pub fn get_wave(&self, channel: u8) -> RunnerResult<Vec<i8>> {
        let field = Field::channel_wave(channel).ok_or(RunnerError::InvalidChannel(channel))?;
        let bytes = self.query_field(field)?;
        Ok(bytes
            .get(WAVE_FRAME_PREFIX_LEN..)
            .unwrap_or_default()
            .iter()
            .map(|&b| b as i8)
            .collect())
    }

    /// Render the catalog as a table.
    pub fn describe_catalog(&self) -> String {
        let mut table = String::new();
        for def in self.catalog.iter() {
            let domain = def
                .domain
                .as_ref()
                .map(|values| values.join("|"))
                .unwrap_or_default();
            // Writing to a String cannot fail.
            let _ = writeln!(
                table,
                "{:<28} {:<20} {:<16} {:<2}  {:<24} {}",
                def.path,
                def.short,
                def.id,
                def.mode.as_str(),
                domain,
                def.comment
            );
        }
        table
    }
}
