//! Naming registry seam and an in-memory domain registry.
//!
//! The auction only needs `register_owner` and `resolve`. `DomainRegistry`
//! additionally keeps the per-owner indexes a registrar front end lists.

use std::collections::{BTreeMap, HashMap};

use auction_types::Address;
use thiserror::Error;

/// Errors surfaced by a registry implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Name already registered: {0}")]
    AlreadyRegistered(String),
}

/// Registry mapping resource names to owner addresses.
pub trait OwnerRegistry {
    /// Record `owner` as the owner of `name`.
    fn register_owner(&mut self, name: &str, owner: Address) -> Result<(), RegistryError>;

    /// Look up the owner of `name`.
    fn resolve(&self, name: &str) -> Option<Address>;
}

/// In-memory registry of domain owners.
#[derive(Clone, Debug, Default)]
pub struct DomainRegistry {
    owners: BTreeMap<String, Address>,
    /// Domains per owner, in registration order
    domains: HashMap<Address, Vec<String>>,
    /// Owner addresses in order of first registration
    addresses: Vec<Address>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every address that owns at least one domain.
    pub fn owners(&self) -> &[Address] {
        &self.addresses
    }

    /// Number of domains held by `owner`.
    pub fn domain_count(&self, owner: &Address) -> usize {
        self.domains.get(owner).map(Vec::len).unwrap_or(0)
    }

    /// The `index`-th domain registered to `owner`.
    pub fn domain_at(&self, owner: &Address, index: usize) -> Option<&str> {
        self.domains
            .get(owner)
            .and_then(|d| d.get(index))
            .map(String::as_str)
    }

    /// All domains registered to `owner`.
    pub fn domains_of(&self, owner: &Address) -> Vec<String> {
        self.domains.get(owner).cloned().unwrap_or_default()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }
}

impl OwnerRegistry for DomainRegistry {
    fn register_owner(&mut self, name: &str, owner: Address) -> Result<(), RegistryError> {
        if self.owners.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        self.owners.insert(name.to_string(), owner);
        if !self.domains.contains_key(&owner) {
            self.addresses.push(owner);
        }
        self.domains.entry(owner).or_default().push(name.to_string());
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<Address> {
        self.owners.get(name).copied()
    }
}
