use crate::DomainError;
use ipnetwork::Ipv6Network;
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// An owned IPv6 prefix. Host bits are cleared at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    network: u128,
    prefix_len: u8,
}

impl Subnet {
    pub fn new(addr: Ipv6Addr, prefix_len: u8) -> Result<Self, DomainError> {
        if prefix_len > 128 {
            return Err(DomainError::InvalidSubnet(format!(
                "prefix length {} exceeds 128",
                prefix_len
            )));
        }

        Ok(Self {
            network: u128::from(addr) & mask(prefix_len),
            prefix_len,
        })
    }

    pub fn network(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.network)
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn contains(&self, addr: Ipv6Addr) -> bool {
        u128::from(addr) & mask(self.prefix_len) == self.network
    }
}

fn mask(prefix_len: u8) -> u128 {
    match prefix_len {
        0 => 0,
        n => u128::MAX << (128 - u32::from(n)),
    }
}

impl FromStr for Subnet {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains('/') {
            return Err(DomainError::InvalidSubnet(format!(
                "'{}' must include a prefix length (e.g. 2001:db8::/48)",
                s
            )));
        }

        let network: Ipv6Network = s
            .parse()
            .map_err(|e| DomainError::InvalidSubnet(format!("{}: {}", s, e)))?;

        Subnet::new(network.ip(), network.prefix())
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

/// Ownership test over the configured subnets.
///
/// A linear scan is enough for the expected tens of prefixes. Overlaps are
/// allowed; containment is binary and declaration order only matters for
/// [`SubnetMatcher::first_match`], which exists for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct SubnetMatcher {
    subnets: Vec<Subnet>,
}

impl SubnetMatcher {
    pub fn new(subnets: Vec<Subnet>) -> Self {
        Self { subnets }
    }

    pub fn parse<I, S>(cidrs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let subnets = cidrs
            .into_iter()
            .map(|cidr| cidr.as_ref().parse())
            .collect::<Result<Vec<Subnet>, _>>()?;
        Ok(Self::new(subnets))
    }

    pub fn matches(&self, addr: Ipv6Addr) -> bool {
        self.first_match(addr).is_some()
    }

    pub fn first_match(&self, addr: Ipv6Addr) -> Option<&Subnet> {
        self.subnets.iter().find(|subnet| subnet.contains(addr))
    }

    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }
}
