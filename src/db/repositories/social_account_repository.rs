use crate::db::error::RepositoryError;
use crate::db::models::social_account::{NewSocialAccount, SocialAccount};
use crate::db::schema::social_accounts;
use diesel::prelude::*;

pub struct SocialAccountRepository;

impl SocialAccountRepository {
    /// Finds the link for a provider identity (`uid` is the provider's subject id).
    pub fn find_by_uid(
        conn: &mut SqliteConnection,
        provider: &str,
        uid: &str,
    ) -> Result<Option<SocialAccount>, RepositoryError> {
        social_accounts::table
            .filter(social_accounts::provider.eq(provider))
            .filter(social_accounts::uid.eq(uid))
            .select(SocialAccount::as_select())
            .first(conn)
            .optional()
            .map_err(Into::into)
    }

    pub fn create(
        conn: &mut SqliteConnection,
        new_account: &NewSocialAccount<'_>,
    ) -> Result<SocialAccount, RepositoryError> {
        diesel::insert_into(social_accounts::table)
            .values(new_account)
            .returning(SocialAccount::as_returning())
            .get_result(conn)
            .map_err(Into::into)
    }
}
