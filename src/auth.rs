// ============================================================================
// Module : auth
// ============================================================================
// Session utilisateur déléguée à un fournisseur d'identité (Google)
//
// L'application ne fait PAS de flow OAuth : elle échange un token d'accès
// déjà émis (LAZYCRYPTO_GOOGLE_ACCESS_TOKEN) contre le profil de
// l'utilisateur. La session sert uniquement à débloquer l'écran watchlist.
// ============================================================================

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Profil renvoyé par l'endpoint userinfo
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserProfile {
    /// Identifiant stable chez le fournisseur
    pub sub: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub picture: Option<String>,
}

impl UserProfile {
    /// Nom affiché dans le header (nom, sinon email, sinon identifiant)
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.email.is_empty() {
            &self.email
        } else {
            &self.sub
        }
    }
}

/// État de la session (jamais persisté)
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Anonymous,
    Authenticated(UserProfile),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            Session::Authenticated(profile) => Some(profile),
            Session::Anonymous => None,
        }
    }

    pub fn login(&mut self, profile: UserProfile) {
        *self = Session::Authenticated(profile);
    }

    pub fn logout(&mut self) {
        *self = Session::Anonymous;
    }
}

/// Récupère le profil associé à un token d'accès
///
/// Le token n'apparaît jamais dans les logs.
#[instrument(skip(access_token))]
pub async fn fetch_profile(userinfo_url: &str, access_token: &str) -> Result<UserProfile> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .build()
        .context("Échec de la création du client HTTP")?;

    debug!("Sending userinfo request");
    let response = client
        .get(userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .context("Échec de la requête vers le fournisseur d'identité")?;

    let status = response.status();
    if !status.is_success() {
        error!(status = %status, "Identity provider rejected the token");
        anyhow::bail!("Le fournisseur d'identité a retourné HTTP {}", status);
    }

    let profile: UserProfile = response
        .json()
        .await
        .context("Échec du parsing du profil utilisateur")?;

    info!(user = %profile.display_name(), "User profile fetched");
    Ok(profile)
}
