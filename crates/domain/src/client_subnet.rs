use crate::DomainError;
use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// EDNS0 Client-Subnet address family numbers (RFC 7871 §6).
pub const FAMILY_IPV4: u16 = 1;
pub const FAMILY_IPV6: u16 = 2;

/// Client-Subnet option attached to every outgoing query.
///
/// The address is stored already masked to `source_prefix`, so two requests for
/// `192.0.2.7/24` and `192.0.2.0/24` describe the same subnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientSubnetOption {
    address: IpAddr,
    source_prefix: u8,
}

impl ClientSubnetOption {
    pub fn new(address: IpAddr, source_prefix: u8) -> Result<Self, DomainError> {
        let network = IpNetwork::new(address, source_prefix).map_err(|e| {
            DomainError::InvalidClientSubnet(format!("{}/{}: {}", address, source_prefix, e))
        })?;

        Ok(Self {
            address: network.network(),
            source_prefix,
        })
    }

    /// Parses either `addr/prefix` or a bare address (implicit /32 or /128).
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        if let Some(subnet) = Self::parse_cidr(input) {
            return subnet;
        }

        let address = IpAddr::from_str(input)
            .map_err(|_| DomainError::InvalidClientSubnet(input.to_string()))?;
        Self::new(address, full_prefix(&address))
    }

    fn parse_cidr(input: &str) -> Option<Result<Self, DomainError>> {
        let (addr_str, prefix_str) = input.split_once('/')?;

        let parsed = IpAddr::from_str(addr_str)
            .ok()
            .zip(prefix_str.parse::<u8>().ok());

        Some(match parsed {
            Some((address, prefix)) => Self::new(address, prefix),
            None => Err(DomainError::InvalidClientSubnet(input.to_string())),
        })
    }

    pub fn family(&self) -> u16 {
        match self.address {
            IpAddr::V4(_) => FAMILY_IPV4,
            IpAddr::V6(_) => FAMILY_IPV6,
        }
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn source_prefix(&self) -> u8 {
        self.source_prefix
    }

    /// Always zero on queries; only responders fill in a scope.
    pub fn scope_prefix(&self) -> u8 {
        0
    }
}

impl fmt::Display for ClientSubnetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.source_prefix)
    }
}

impl FromStr for ClientSubnetOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn full_prefix(address: &IpAddr) -> u8 {
    match address {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cidr_is_masked_to_network() {
        let subnet = ClientSubnetOption::parse("192.0.2.77/24").unwrap();
        assert_eq!(subnet.address(), "192.0.2.0".parse::<IpAddr>().unwrap());
        assert_eq!(subnet.source_prefix(), 24);
        assert_eq!(subnet.family(), FAMILY_IPV4);
    }

    #[test]
    fn test_bare_ipv6_gets_full_prefix() {
        let subnet = ClientSubnetOption::parse("2001:db8::1").unwrap();
        assert_eq!(subnet.source_prefix(), 128);
        assert_eq!(subnet.family(), FAMILY_IPV6);
        assert_eq!(subnet.scope_prefix(), 0);
    }

    #[test]
    fn test_prefix_out_of_range() {
        assert!(ClientSubnetOption::parse("10.0.0.0/33").is_err());
        assert!(ClientSubnetOption::parse("2001:db8::/129").is_err());
    }

    #[test]
    fn test_display() {
        let subnet = ClientSubnetOption::parse("10.1.2.3/8").unwrap();
        assert_eq!(subnet.to_string(), "10.0.0.0/8");
    }
}
