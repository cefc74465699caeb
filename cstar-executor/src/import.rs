use cstar_plan::{ImportRequest, translate_keyspace};
use cstar_result::{Error, Result};

use crate::session::{ConnectionConfig, ConnectionProvider, Session, SessionGuard};

/// CREATE FOREIGN TABLE statements for the tables of a remote keyspace.
///
/// The session is returned to the provider on every path. A keyspace that does not
/// exist yields no statements and a warning.
pub fn import_foreign_schema<P: ConnectionProvider>(
    provider: &P,
    config: &ConnectionConfig,
    request: &ImportRequest,
) -> Result<Vec<String>> {
    let mut session = SessionGuard::acquire(provider, config, false)?;
    let metadata = session
        .session_mut()?
        .keyspace_metadata(&request.remote_schema);
    session.release();

    let keyspace = match metadata {
        Ok(Some(keyspace)) => keyspace,
        Ok(None) => {
            tracing::warn!(keyspace = %request.remote_schema, "remote keyspace not found");
            return Ok(Vec::new());
        }
        Err(failure) => {
            return Err(Error::remote("SELECT", failure.message));
        }
    };

    let statements = translate_keyspace(&keyspace, request);
    tracing::debug!(
        keyspace = %keyspace.name,
        server = %request.server_name,
        tables = statements.len(),
        "imported foreign schema"
    );
    Ok(statements)
}
