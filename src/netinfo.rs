//! Best-effort network identity probe
//!
//! Resolves the MAC, first IPv4 and first IPv6 address of a named interface.
//! Every sub-lookup is independent: whatever cannot be resolved stays zeroed
//! and is logged, but the probe itself never fails. The daemon keeps polling
//! through NIC outages, so degraded data beats a dead loop.

use std::io;

use log::error;

use crate::layout::records::NetworkIdentity;

/// Probe `ifname` and return a best-effort identity record
pub fn probe(ifname: &str) -> NetworkIdentity {
    let mut identity = NetworkIdentity::default();

    match mac_address(ifname) {
        Ok(mac) => identity.mac = mac,
        Err(e) => error!("could not get MAC address of {}: {}", ifname, e),
    }

    match first_addresses(ifname) {
        Ok((ipv4, ipv6)) => {
            if let Some(addr) = ipv4 {
                identity.ipv4 = addr.octets();
            }
            if let Some(addr) = ipv6 {
                identity.ipv6 = addr.octets();
            }
        }
        Err(e) => error!("could not enumerate addresses of {}: {}", ifname, e),
    }

    identity
}

/// Hardware-address query via ioctl on a throwaway datagram socket
fn mac_address(ifname: &str) -> io::Result<[u8; 6]> {
    if ifname.len() >= libc::IFNAMSIZ {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "interface name too long",
        ));
    }

    let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
    if fd < 0 {
        return Err(io::Error::last_os_error());
    }

    let mut ifr: libc::ifreq = unsafe { std::mem::zeroed() };
    for (dst, src) in ifr.ifr_name.iter_mut().zip(ifname.as_bytes()) {
        *dst = *src as libc::c_char;
    }

    let res = unsafe { libc::ioctl(fd, libc::SIOCGIFHWADDR, &mut ifr) };
    let ioctl_err = io::Error::last_os_error();
    // The socket exists only for this query
    unsafe { libc::close(fd) };
    if res != 0 {
        return Err(ioctl_err);
    }

    let hwaddr = unsafe { ifr.ifr_ifru.ifru_hwaddr };
    let mut mac = [0u8; 6];
    for (dst, src) in mac.iter_mut().zip(hwaddr.sa_data.iter()) {
        *dst = *src as u8;
    }
    Ok(mac)
}

/// First IPv4 and first IPv6 address bound to `ifname`
fn first_addresses(
    ifname: &str,
) -> nix::Result<(Option<std::net::Ipv4Addr>, Option<std::net::Ipv6Addr>)> {
    let mut ipv4 = None;
    let mut ipv6 = None;

    for ifaddr in nix::ifaddrs::getifaddrs()? {
        if ifaddr.interface_name != ifname {
            continue;
        }
        let addr = match ifaddr.address {
            Some(addr) => addr,
            None => continue,
        };
        if ipv4.is_none() {
            if let Some(sin) = addr.as_sockaddr_in() {
                ipv4 = Some(std::net::Ipv4Addr::from(sin.ip()));
            }
        }
        if ipv6.is_none() {
            if let Some(sin6) = addr.as_sockaddr_in6() {
                ipv6 = Some(sin6.ip());
            }
        }
    }

    Ok((ipv4, ipv6))
}
