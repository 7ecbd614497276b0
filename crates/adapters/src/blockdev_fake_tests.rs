use super::*;

#[test]
fn returns_none_for_an_unseen_volume() {
    let finder = FakeBlockDeviceFinder::new();
    assert_eq!(finder.find_by_volume_id("vol-aaa").unwrap(), None);
}

#[test]
fn returns_the_configured_device_once_set() {
    let finder = FakeBlockDeviceFinder::new();
    finder.set("vol-aaa", "/dev/xvdf");
    assert_eq!(
        finder.find_by_volume_id("vol-aaa").unwrap(),
        Some("/dev/xvdf".to_string())
    );
}
