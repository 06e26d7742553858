pub mod category;

use diesel_async::AsyncPgConnection;

/// Populates tables with the rows the application expects to find at startup.
pub trait Seeder {
    /// Seeds the database and returns how many rows were written.
    ///
    /// ## Errors
    /// Returns an error if the seeding operation fails.
    fn seed(&self, conn: &mut AsyncPgConnection)
    -> impl Future<Output = anyhow::Result<usize>>;
}
