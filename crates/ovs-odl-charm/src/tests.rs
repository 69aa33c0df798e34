//! Dispatcher tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ovs_odl_core::{
    ControllerClient, MockControllerClient, MockLocalInventory, MockSwitchConfigurator,
    OvsOdlError, SwitchConfigurationError,
};
use ovs_odl_types::{
    ControllerConnection, LocalInterfaceConfig, OvsdbManager, WorkloadState, WorkloadStatus,
};

use crate::{
    planned_actions, Action, CharmConfig, CharmState, ControllerFactory, Dispatcher, Facts,
    NodeRegistration,
};

fn manager() -> OvsdbManager {
    OvsdbManager::new("tcp:odl-controller:6640", "10.0.0.10")
}

fn connection() -> ControllerConnection {
    ControllerConnection::new("odl-controller", "admin", "admin")
}

fn inventory() -> MockLocalInventory {
    let mut inventory = MockLocalInventory::new();
    inventory
        .expect_hostname()
        .returning(|| Ok("compute-0".to_string()));
    inventory
        .expect_data_plane_address()
        .returning(|_| Ok("10.1.1.1".parse().unwrap()));
    inventory
        .expect_local_interface_config()
        .returning(|| {
            let mut interfaces = LocalInterfaceConfig::new();
            interfaces.insert("00:11:22:33:44:55".parse().unwrap(), "physnet1", "eth1");
            Ok(interfaces)
        });
    inventory
}

fn configuring_switch() -> MockSwitchConfigurator {
    let mut switch = MockSwitchConfigurator::new();
    switch.expect_set_other_config().returning(|_, _| Ok(()));
    switch.expect_set_external_id().returning(|_, _| Ok(()));
    switch.expect_set_manager().returning(|_| Ok(()));
    switch
}

fn no_controller() -> ControllerFactory {
    Box::new(
        |_: &ControllerConnection| -> ovs_odl_core::Result<Arc<dyn ControllerClient>> {
            panic!("controller should not be contacted")
        },
    )
}

fn counting_factory(client: MockControllerClient, calls: Arc<AtomicUsize>) -> ControllerFactory {
    let client: Arc<dyn ControllerClient> = Arc::new(client);
    Box::new(
        move |_: &ControllerConnection| -> ovs_odl_core::Result<Arc<dyn ControllerClient>> {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::clone(&client))
        },
    )
}

fn dispatcher(
    switch: MockSwitchConfigurator,
    inventory: MockLocalInventory,
    controllers: ControllerFactory,
) -> Dispatcher {
    Dispatcher::new(
        Arc::new(switch),
        Arc::new(inventory),
        controllers,
        &CharmConfig::default(),
    )
}

#[test]
fn test_planned_actions_order() {
    let facts = Facts {
        charm_installed: true,
        ovsdb_manager: Some(manager()),
        controller_api: Some(connection()),
        neutron_plugin_connected: true,
    };

    assert_eq!(
        planned_actions(&facts, &CharmState::default()),
        vec![
            Action::ConfigureOvs,
            Action::PublishNeutronPlugin,
            Action::RegisterNode,
            Action::RegisterMacs,
        ]
    );
}

#[test]
fn test_planned_actions_unconfigure() {
    let facts = Facts {
        charm_installed: true,
        ..Default::default()
    };
    let configured = CharmState {
        ovs_configured: true,
    };

    assert_eq!(
        planned_actions(&facts, &configured),
        vec![Action::UnconfigureOvs]
    );
    assert!(planned_actions(&facts, &CharmState::default()).is_empty());
}

#[test]
fn test_planned_actions_require_install() {
    let facts = Facts {
        ovsdb_manager: Some(manager()),
        ..Default::default()
    };
    assert!(planned_actions(&facts, &CharmState::default()).is_empty());
}

#[test]
fn test_facts_from_json() {
    let facts: Facts = serde_json::from_str(
        r#"{
            "charm-installed": true,
            "ovsdb-manager": {
                "connection-string": "tcp:odl-controller:6640",
                "private-address": "10.0.0.10"
            },
            "controller-api": {
                "host": "odl-controller",
                "username": "admin",
                "password": "admin"
            }
        }"#,
    )
    .unwrap();

    assert!(facts.charm_installed);
    assert!(!facts.neutron_plugin_connected);
    assert_eq!(facts.ovsdb_manager, Some(manager()));
    assert_eq!(facts.controller_api.unwrap().port, 8181);
}

#[tokio::test]
async fn test_dispatch_configures_switch() {
    let dispatcher = dispatcher(configuring_switch(), inventory(), no_controller());
    let facts = Facts {
        charm_installed: true,
        ovsdb_manager: Some(manager()),
        ..Default::default()
    };

    let mut state = CharmState::default();
    let report = dispatcher.dispatch(&facts, &mut state).await.unwrap();

    assert!(state.ovs_configured);
    assert_eq!(report.actions, vec![Action::ConfigureOvs]);
    assert_eq!(report.state, state);
    assert_eq!(report.status, Some(WorkloadStatus::ready()));
}

#[tokio::test]
async fn test_dispatch_unconfigures_switch() {
    let mut switch = MockSwitchConfigurator::new();
    switch.expect_del_manager().times(1).returning(|| Ok(()));
    switch
        .expect_list_bridges()
        .returning(|| Ok(vec!["br-int".to_string()]));
    switch.expect_del_controller().times(1).returning(|_| Ok(()));

    let dispatcher = dispatcher(switch, inventory(), no_controller());
    let facts = Facts {
        charm_installed: true,
        ..Default::default()
    };

    let mut state = CharmState {
        ovs_configured: true,
    };
    let report = dispatcher.dispatch(&facts, &mut state).await.unwrap();

    assert!(!state.ovs_configured);
    assert_eq!(report.actions, vec![Action::UnconfigureOvs]);
    assert_eq!(report.status.unwrap().state, WorkloadState::Waiting);
}

#[tokio::test]
async fn test_dispatch_publishes_neutron_plugin() {
    let dispatcher = dispatcher(
        MockSwitchConfigurator::new(),
        inventory(),
        no_controller(),
    );
    let facts = Facts {
        neutron_plugin_connected: true,
        ..Default::default()
    };

    let mut state = CharmState::default();
    let report = dispatcher.dispatch(&facts, &mut state).await.unwrap();

    assert_eq!(report.actions, vec![Action::PublishNeutronPlugin]);
    assert_eq!(report.neutron_plugin.unwrap().plugin, "ovs-odl");
    assert!(report.status.is_none());
}

#[tokio::test]
async fn test_dispatch_registers_with_controller() {
    let mut controller = MockControllerClient::new();
    controller
        .expect_is_device_registered()
        .times(1)
        .returning(|_| Ok(false));
    controller
        .expect_register_device()
        .withf(|hostname, ip| hostname == "compute-0" && ip.to_string() == "10.1.1.1")
        .times(1)
        .returning(|_, _| Ok(()));
    controller
        .expect_is_net_device_registered()
        .times(1)
        .returning(|_, _, _, _, _| Ok(false));
    controller
        .expect_register_net_device()
        .withf(|hostname, network, interface, _, _| {
            hostname == "compute-0" && network == "physnet1" && interface == "eth1"
        })
        .times(1)
        .returning(|_, _, _, _, _| Ok(()));

    let calls = Arc::new(AtomicUsize::new(0));
    let dispatcher = dispatcher(
        MockSwitchConfigurator::new(),
        inventory(),
        counting_factory(controller, calls.clone()),
    );
    let facts = Facts {
        controller_api: Some(connection()),
        ..Default::default()
    };

    let mut state = CharmState::default();
    let report = dispatcher.dispatch(&facts, &mut state).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        report.actions,
        vec![Action::RegisterNode, Action::RegisterMacs]
    );
    assert_eq!(report.node_registration, Some(NodeRegistration::Registered));
    assert_eq!(report.mac_registration.unwrap().registered.len(), 1);
}

#[tokio::test]
async fn test_dispatch_stops_at_first_failure() {
    let mut switch = MockSwitchConfigurator::new();
    switch.expect_set_other_config().returning(|_, _| {
        Err(SwitchConfigurationError::CommandFailed {
            command: "ovs-vsctl set Open_vSwitch .".to_string(),
            exit_code: Some(1),
            stderr: "database connection failed".to_string(),
        }
        .into())
    });
    switch.expect_set_manager().never();

    let calls = Arc::new(AtomicUsize::new(0));
    let dispatcher = dispatcher(
        switch,
        inventory(),
        counting_factory(MockControllerClient::new(), calls.clone()),
    );
    let facts = Facts {
        charm_installed: true,
        ovsdb_manager: Some(manager()),
        controller_api: Some(connection()),
        neutron_plugin_connected: false,
    };

    let mut state = CharmState::default();
    let err = dispatcher.dispatch(&facts, &mut state).await.unwrap_err();

    assert!(matches!(err, OvsOdlError::SwitchConfiguration(_)));
    assert!(!state.ovs_configured);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
