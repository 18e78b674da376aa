//! Link-time provider registry
//!
//! Every provider module invokes [`register_provider!`] once. The macro
//! places a [`ProviderRegistration`] into [`PROVIDER_REGISTRY`], so the CLI
//! can list and build providers without a hand-maintained table.

use super::{Provider, ProviderInfo};
use crate::Result;
use url::Url;

/// One registry entry, produced by [`register_provider!`].
#[doc(hidden)]
pub struct ProviderRegistration {
    pub info: ProviderInfo,
    /// URI schemes this provider answers to
    pub schemes: &'static [&'static str],
    /// Parses the provider config from a URL and builds the provider
    pub build: fn(&Url) -> Result<Box<dyn Provider>>,
}

impl ProviderRegistration {
    pub fn handles(&self, scheme: &str) -> bool {
        self.schemes.contains(&scheme)
    }
}

#[doc(hidden)]
#[linkme::distributed_slice]
pub static PROVIDER_REGISTRY: [ProviderRegistration];

/// The registration handling `scheme`, if any.
pub fn lookup(scheme: &str) -> Option<&'static ProviderRegistration> {
    PROVIDER_REGISTRY.iter().find(|reg| reg.handles(scheme))
}

/// Registers a provider and gives it a `new(config)` constructor.
///
/// The provider struct must hold its parsed config in a `config` field, and
/// the config type must implement `TryFrom<&Url>`.
///
/// ```ignore
/// pub struct DopplerProvider {
///     config: DopplerConfig,
/// }
///
/// register_provider! {
///     struct: DopplerProvider,
///     config: DopplerConfig,
///     name: "doppler",
///     description: "Doppler secrets manager",
///     schemes: ["doppler"],
///     examples: ["doppler://"],
/// }
/// ```
#[doc(hidden)]
#[macro_export]
macro_rules! register_provider {
    (
        struct: $provider:ident,
        config: $config:ty,
        name: $name:expr,
        description: $description:expr,
        schemes: [$($scheme:expr),* $(,)?],
        examples: [$($example:expr),* $(,)?] $(,)?
    ) => {
        impl $provider {
            const PROVIDER_NAME: &'static str = $name;

            pub fn new(config: $config) -> Self {
                Self { config }
            }
        }

        const _: () = {
            #[linkme::distributed_slice($crate::provider::PROVIDER_REGISTRY)]
            static REGISTRATION: $crate::provider::ProviderRegistration =
                $crate::provider::ProviderRegistration {
                    info: $crate::provider::ProviderInfo {
                        name: $name,
                        description: $description,
                        examples: &[$($example),*],
                    },
                    schemes: &[$($scheme),*],
                    build: |url| Ok(Box::new(<$provider>::new(<$config>::try_from(url)?))),
                };
        };
    };
}
