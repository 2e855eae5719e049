use toad_array::Array;

use crate::code::Method;
use crate::engine::{Engine, ResourceOptions};
use crate::net::Addrd;
use crate::platform::Platform;
use crate::resource::{ApplicationResource, Methods, Registration, Registry, ResourceId};
use crate::Error;

/// # Adapter
/// Owns the protocol engine and the [`Registry`] of application resources
/// it dispatches to.
///
/// Everything that touches the engine takes `&mut self`, so the engine is
/// only ever driven by whoever owns the adapter (normally a
/// [`PollLoop`](crate::poll::PollLoop)). Other threads request
/// notifications through a [`Notifier`](crate::observe::Notifier) instead.
///
/// The `'r` lifetime is the lifetime of the application resources; a
/// resource can't be dropped while the adapter still dispatches to it.
#[derive(Debug)]
pub struct Adapter<E, A> {
  engine: E,
  registry: Registry<A>,
  network_ready: bool,
}

impl<'r, E, A> Adapter<E, A>
  where E: Engine,
        A: Array<Item = Registration<'r, E::Resource>>
{
  /// Wrap an engine that has not been started yet
  pub fn new(engine: E) -> Self {
    Self { engine,
           registry: Registry::new(),
           network_ready: false }
  }

  /// Initialize the engine
  pub fn start(&mut self) -> Result<(), Error> {
    self.engine.init().map_err(|e| {
                         log::error!("engine failed to start: {:?}", e);
                         Error::Engine
                       })
  }

  /// Create a native resource at `uri` and bind `app` to it.
  ///
  /// The resource answers no methods until
  /// [`register_method`](Resource::register_method) is called.
  pub fn create_resource(&mut self,
                         app: &'r dyn ApplicationResource,
                         uri: &str)
                         -> Result<ResourceId, Error> {
    if self.registry.is_full() {
      return Err(Error::RegistryFull);
    }

    let native = self.engine
                     .create_resource(uri, ResourceOptions::default())
                     .ok_or_else(|| {
                       log::error!("engine could not create {}", uri);
                       Error::CreateResource
                     })?;

    let reg = match Registration::new(native, app, uri) {
      | Ok(reg) => reg,
      | Err(e) => {
        self.engine.remove_resource(native);
        return Err(e);
      },
    };

    self.engine.set_allowed_methods(native, Methods::NONE);
    let id = self.registry.push(reg)?;
    log::debug!("created {} at {}", id, uri);
    Ok(id)
  }

  /// Capability handle for configuring a registered resource
  pub fn resource(&mut self, id: ResourceId) -> Result<Resource<'_, E, A>, Error> {
    match self.registry.get(id) {
      | Some(_) => Ok(Resource { adapter: self, id }),
      | None => Err(Error::UnknownResource),
    }
  }

  /// Deregister a resource and delete its native counterpart
  pub fn remove_resource(&mut self, id: ResourceId) -> Result<(), Error> {
    let native = self.registry.vacate(id).ok_or(Error::UnknownResource)?;
    self.engine.remove_resource(native);
    log::debug!("removed {}", id);
    Ok(())
  }

  /// Ask the engine to notify every observer of a resource.
  ///
  /// The notifications go out during the next [`Adapter::do_work`].
  pub fn notify_observers(&mut self, id: ResourceId) -> Result<(), Error> {
    let native = self.native(id)?;
    self.engine.notify_observers(native).map_err(|e| {
                                           log::error!("notify {} failed: {:?}", id, e);
                                           Error::Engine
                                         })
  }

  /// Record whether the network is up.
  ///
  /// While it is down the poll loop doesn't read the socket.
  pub fn set_network_ready(&mut self, ready: bool) {
    if ready != self.network_ready {
      log::info!("network {}", if ready { "up" } else { "down" });
    }

    self.network_ready = ready;
  }

  /// Is the network up?
  pub fn network_ready(&self) -> bool {
    self.network_ready
  }

  /// Log every registration that answers no methods.
  ///
  /// Such a resource can't do anything but say 4.05; this is almost
  /// always a forgotten `register_method`.
  pub fn warn_unusable(&self) -> usize {
    self.registry
        .iter()
        .filter(|(_, r)| r.methods == Methods::NONE)
        .inspect(|(id, r)| {
          log::warn!("resource {} at {} has no registered methods",
                     id,
                     r.uri.as_str())
        })
        .count()
  }

  /// Hand a received datagram to the engine
  pub fn handle_datagram(&mut self, dgram: Addrd<&[u8]>, platform: &mut dyn Platform) {
    self.engine
        .handle_incoming_packet(dgram, platform, &self.registry);
  }

  /// Let the engine retransmit, expire and notify
  pub fn do_work(&mut self, platform: &mut dyn Platform) {
    self.engine.do_work(platform, &self.registry);
  }

  /// The resource registry
  pub fn registry(&self) -> &Registry<A> {
    &self.registry
  }

  /// The engine
  pub fn engine(&self) -> &E {
    &self.engine
  }

  fn native(&self, id: ResourceId) -> Result<E::Resource, Error> {
    self.registry
        .get(id)
        .and_then(|r| r.native)
        .ok_or(Error::UnknownResource)
  }
}

/// A registered resource, borrowed from its [`Adapter`] for configuration
#[derive(Debug)]
pub struct Resource<'a, E, A> {
  adapter: &'a mut Adapter<E, A>,
  id: ResourceId,
}

impl<'a, 'r, E, A> Resource<'a, E, A>
  where E: Engine,
        A: Array<Item = Registration<'r, E::Resource>>
{
  /// This resource's id
  pub fn id(&self) -> ResourceId {
    self.id
  }

  /// Answer `method` from now on.
  ///
  /// Only GET, POST, PUT and DELETE can be registered.
  pub fn register_method(&mut self, method: Method) -> Result<&mut Self, Error> {
    let bit = Methods::of(method).ok_or(Error::NotAMethod)?;
    let Adapter { engine, registry, .. } = &mut *self.adapter;
    let reg = registry.get_mut(self.id).ok_or(Error::UnknownResource)?;
    let native = reg.native.ok_or(Error::UnknownResource)?;

    reg.methods |= bit;
    engine.set_allowed_methods(native, reg.methods);
    Ok(self)
  }

  /// Accept Observe registrations
  pub fn register_observable(&mut self) -> Result<&mut Self, Error> {
    let Adapter { engine, registry, .. } = &mut *self.adapter;
    let reg = registry.get_mut(self.id).ok_or(Error::UnknownResource)?;
    let native = reg.native.ok_or(Error::UnknownResource)?;

    reg.observable = true;
    engine.set_observable(native, true);
    Ok(self)
  }

  /// See [`Adapter::notify_observers`]
  pub fn notify_observers(&mut self) -> Result<(), Error> {
    self.adapter.notify_observers(self.id)
  }
}
