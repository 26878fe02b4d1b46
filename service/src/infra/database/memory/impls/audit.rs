//! Audit-log-related [`Database`] implementations.

use common::operations::Insert;
use tracerr::Traced;

use crate::{
    domain::audit,
    infra::{
        database::{
            self,
            memory::{Connection, Memory},
        },
        Database,
    },
};

impl<C: Connection> Database<Insert<audit::Entry>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(entry): Insert<audit::Entry>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with(|state| state.audit_log.push(entry))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}
