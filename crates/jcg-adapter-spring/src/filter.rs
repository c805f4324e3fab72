use jcg_classfile::{ClassUnit, MethodUnit};

/// Annotation suffixes that mark Lombok-style generated accessors.
const ACCESSOR_MARKERS: &[&str] = &[".Data", ".Getter", ".Setter", ".Builder"];

/// Per-class policy for methods that add noise to body artifacts:
/// generated accessors on annotated classes and service interface
/// stubs.
#[derive(Debug, Clone, Copy)]
pub struct MethodFilter {
    is_interface: bool,
    service_like: bool,
    accessor_markers: bool,
}

impl MethodFilter {
    pub fn for_unit(unit: &ClassUnit) -> Self {
        let accessor_markers = unit.annotations.iter().any(|annotation| {
            ACCESSOR_MARKERS
                .iter()
                .any(|marker| annotation.type_name.ends_with(marker))
        });
        Self {
            is_interface: unit.is_interface(),
            service_like: unit.name.to_lowercase().contains("service"),
            accessor_markers,
        }
    }

    /// True when `method` should be left out of body artifacts.
    pub fn should_skip(&self, method: &MethodUnit) -> bool {
        if self.service_like && self.is_interface {
            return true;
        }
        self.accessor_markers
            && (is_getter(&method.name, &method.descriptor)
                || is_setter(&method.name, &method.descriptor)
                || is_builder_method(&method.name, &method.descriptor))
    }
}

fn is_getter(name: &str, descriptor: &str) -> bool {
    let bytes = name.as_bytes();
    if name.starts_with("get") && name.len() > 3 && bytes[3].is_ascii_uppercase() {
        return !descriptor.starts_with("()V");
    }
    if name.starts_with("is") && name.len() > 2 && bytes[2].is_ascii_uppercase() {
        return descriptor.starts_with("()Z");
    }
    false
}

fn is_setter(name: &str, descriptor: &str) -> bool {
    name.starts_with("set")
        && name.len() > 3
        && name.as_bytes()[3].is_ascii_uppercase()
        && descriptor.ends_with(")V")
}

fn is_builder_method(name: &str, descriptor: &str) -> bool {
    name == "builder"
        || name == "toBuilder"
        || (descriptor.contains("Builder") && !descriptor.ends_with(")V"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn method(name: &str, descriptor: &str) -> MethodUnit {
        MethodUnit {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            access: 0x0001,
            annotations: Vec::new(),
            instructions: Vec::new(),
        }
    }

    fn unit(name: &str, access: u16, annotation: Option<&str>) -> ClassUnit {
        ClassUnit {
            name: name.to_string(),
            path: PathBuf::from("Unit.class"),
            source_file: None,
            access,
            major_version: 52,
            interfaces: Vec::new(),
            annotations: annotation
                .map(|type_name| {
                    vec![jcg_classfile::AnnotationInfo {
                        type_name: type_name.to_string(),
                        values: Vec::new(),
                    }]
                })
                .unwrap_or_default(),
            methods: Vec::new(),
        }
    }

    #[test]
    fn skips_accessors_only_on_annotated_classes() {
        let annotated = MethodFilter::for_unit(&unit("com.acme.User", 0x0021, Some("lombok.Data")));
        assert!(annotated.should_skip(&method("getName", "()Ljava/lang/String;")));
        assert!(annotated.should_skip(&method("isActive", "()Z")));
        assert!(annotated.should_skip(&method("setName", "(Ljava/lang/String;)V")));
        assert!(annotated.should_skip(&method("builder", "()Lcom/acme/User$Builder;")));
        assert!(!annotated.should_skip(&method("promote", "()V")));

        let plain = MethodFilter::for_unit(&unit("com.acme.User", 0x0021, None));
        assert!(!plain.should_skip(&method("getName", "()Ljava/lang/String;")));
    }

    #[test]
    fn getter_prefix_alone_is_not_enough() {
        let filter = MethodFilter::for_unit(&unit("com.acme.User", 0x0021, Some("lombok.Data")));
        // Lower-case continuation and void return are not accessors.
        assert!(!filter.should_skip(&method("getaway", "()Ljava/lang/String;")));
        assert!(!filter.should_skip(&method("getName", "()V")));
        assert!(!filter.should_skip(&method("island", "()Z")));
    }

    #[test]
    fn skips_service_interface_stubs() {
        let filter = MethodFilter::for_unit(&unit("com.acme.UserService", 0x0601, None));
        assert!(filter.should_skip(&method("findAll", "()Ljava/util/List;")));

        let concrete = MethodFilter::for_unit(&unit("com.acme.UserServiceImpl", 0x0021, None));
        assert!(!concrete.should_skip(&method("findAll", "()Ljava/util/List;")));

        let other_interface = MethodFilter::for_unit(&unit("com.acme.Renderer", 0x0601, None));
        assert!(!other_interface.should_skip(&method("render", "()V")));
    }
}
