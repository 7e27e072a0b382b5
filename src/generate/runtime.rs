// src/generate/runtime.rs
//! Names of the runtime classes and members generated code links against

pub const OBJECT: &str = "java/lang/Object";
pub const CLASS_DESCRIPTOR: &str = "Ljava/lang/Class;";
pub const STRING_DESCRIPTOR: &str = "Ljava/lang/String;";

pub const CONSUMER: &str = "java/util/function/Consumer";
pub const ACCEPT: &str = "accept";
pub const ACCEPT_DESCRIPTOR: &str = "(Ljava/lang/Object;)V";

/// Entrypoint interface the initializer implements
pub const FORGE_INITIALIZER: &str = "net/patchworkmc/api/ForgeInitializer";
pub const GET_MOD_ID: &str = "getModId";
pub const GET_MOD_ID_DESCRIPTOR: &str = "()Ljava/lang/String;";
pub const ON_FORGE_INITIALIZE: &str = "onForgeInitialize";

pub const OBJECT_HOLDER_REGISTRY: &str = "net/patchworkmc/impl/registries/ObjectHolderRegistry";
pub const OBJECT_HOLDER_REGISTRY_DESCRIPTOR: &str = "Lnet/patchworkmc/impl/registries/ObjectHolderRegistry;";
pub const OBJECT_HOLDER_REGISTER_DESCRIPTOR: &str =
    "(Ljava/lang/Class;Ljava/lang/String;Ljava/lang/String;Ljava/util/function/Consumer;)V";

pub const EVENT_REGISTRAR_REGISTRY: &str = "net/patchworkmc/impl/event/EventRegistrarRegistry";
pub const EVENT_REGISTRAR_REGISTRY_DESCRIPTOR: &str = "Lnet/patchworkmc/impl/event/EventRegistrarRegistry;";
pub const REGISTER_STATIC: &str = "registerStatic";
pub const REGISTER_STATIC_DESCRIPTOR: &str = "(Ljava/lang/Class;Ljava/util/function/Consumer;)V";

/// Registers a subscriber class only when running on the given side
pub const SIDED_REGISTRAR: &str = "net/patchworkmc/impl/event/EventBusSubscriberRegistrar";
pub const REGISTER_ON_SIDE: &str = "registerOnSide";
pub const REGISTER_ON_SIDE_DESCRIPTOR: &str =
    "(Lnet/minecraftforge/eventbus/api/IEventBus;Ljava/lang/Class;Ljava/lang/String;)V";

pub const INSTANCE: &str = "INSTANCE";
pub const REGISTER: &str = "register";

pub const EVENT_BUS: &str = "net/minecraftforge/eventbus/api/IEventBus";
pub const EVENT_BUS_DESCRIPTOR: &str = "Lnet/minecraftforge/eventbus/api/IEventBus;";
pub const ADD_LISTENER: &str = "addListener";
pub const ADD_LISTENER_DESCRIPTOR: &str = "(Lnet/minecraftforge/eventbus/api/EventPriority;ZLjava/lang/Class;Ljava/util/function/Consumer;)V";
pub const BUS_REGISTER_DESCRIPTOR: &str = "(Ljava/lang/Object;)V";

pub const EVENT_PRIORITY: &str = "net/minecraftforge/eventbus/api/EventPriority";
pub const EVENT_PRIORITY_DESCRIPTOR: &str = "Lnet/minecraftforge/eventbus/api/EventPriority;";

pub const MINECRAFT_FORGE: &str = "net/minecraftforge/common/MinecraftForge";
pub const FORGE_EVENT_BUS_FIELD: &str = "EVENT_BUS";

pub const MOD_LOADING_CONTEXT: &str = "net/minecraftforge/fml/javafmlmod/FMLJavaModLoadingContext";
pub const MOD_LOADING_CONTEXT_GET_DESCRIPTOR: &str = "()Lnet/minecraftforge/fml/javafmlmod/FMLJavaModLoadingContext;";
pub const GET_MOD_EVENT_BUS: &str = "getModEventBus";
pub const GET_MOD_EVENT_BUS_DESCRIPTOR: &str = "()Lnet/minecraftforge/eventbus/api/IEventBus;";
